use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for ISO 3166-2 style region codes
    /// - Valid: "SN-DK", "SN-TH", "CI-AB", "SN-1"
    /// - Invalid: "sn-dk", "SNDK", "SN-", "SN-DKRR", "SN DK"
    pub static ref REGION_CODE_REGEX: Regex = Regex::new(r"^[A-Z]{2}-[A-Z0-9]{1,3}$").unwrap();
}
