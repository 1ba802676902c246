//! File naming for the IvyDB International daily archives.
//!
//! One zip is published per day, e.g. `INTL.IVYDB.20150914D.zip`, and unpacks
//! into several text files like `INTL.IVYOPPRCD.20150914D.txt`.

use jiff::civil::Date;

pub const VENDOR_PREFIX: &str = "INTL";

/// Extension of the files inside the archive.  The purge and the extraction
/// check both use this one value.
pub const EXTRACTED_EXTENSION: &str = "txt";

/// The date formatted as `YYYYMMDD`.
pub fn yyyymmdd(date: &Date) -> String {
    date.strftime("%Y%m%d").to_string()
}

/// Name of the zip file for the day, e.g. `INTL.IVYDB.20150914D.zip`.
pub fn archive_name(date: &Date) -> String {
    format!("{}.IVYDB.{}D.zip", VENDOR_PREFIX, yyyymmdd(date))
}

/// Glob pattern (file name only) matching the extracted files for the day.
pub fn extracted_pattern(date: &Date) -> String {
    format!(
        "{}.IVY*.{}D.{}",
        VENDOR_PREFIX,
        yyyymmdd(date),
        EXTRACTED_EXTENSION
    )
}
