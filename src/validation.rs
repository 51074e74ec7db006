//! Field predicates shared by the services.
//!
//! Each rule is a plain function; `Checks` folds them into one
//! `AppError::Validation` listing every failed field.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use regex::Regex;

use crate::{errors::AppError, models::account::Role};

static NIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(615|303)([12])(\d{4})(0[1-9]|1[0-2])(\d{3,5})$").expect("static regex")
});

static BIRTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?$")
        .expect("static regex")
});

const FIRST_NIP_YEAR: i32 = 2000;
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Role encoded by a well-formed NIP: `<615|303><1|2><YYYY><MM><3-5 digits>`,
/// with the year between 2000 and the current year.
pub fn nip_role(nip: &str) -> Option<Role> {
    let caps = NIP.captures(nip)?;
    let year: i32 = caps[3].parse().ok()?;
    if !(FIRST_NIP_YEAR..=Utc::now().year()).contains(&year) {
        return None;
    }
    match &caps[1] {
        "615" => Some(Role::Admin),
        "303" => Some(Role::Nurse),
        _ => None,
    }
}

pub fn is_admin_nip(nip: &str) -> bool {
    nip_role(nip) == Some(Role::Admin)
}

pub fn is_nurse_nip(nip: &str) -> bool {
    nip_role(nip) == Some(Role::Nurse)
}

fn char_len_between(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.chars().count())
}

pub fn is_valid_name(name: &str) -> bool {
    char_len_between(name, 5, 50)
}

pub fn is_valid_password(password: &str) -> bool {
    char_len_between(password, 5, 33)
}

pub fn is_valid_identity_number(n: i64) -> bool {
    (1_000_000_000_000_000..=9_999_999_999_999_999).contains(&n)
}

/// National numbers only: `+62`, 10 to 15 characters overall.
pub fn is_valid_phone_number(phone: &str) -> bool {
    phone.starts_with("+62") && char_len_between(phone, 10, 15)
}

pub fn is_valid_clinical_text(s: &str) -> bool {
    !s.trim().is_empty() && char_len_between(s, 1, 2000)
}

/// ISO-8601 date-time; a missing offset is read as UTC.
pub fn parse_birth_date(raw: &str) -> Option<DateTime<Utc>> {
    if !BIRTH_DATE.is_match(raw) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn image_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[derive(Debug, Default)]
pub struct Checks {
    failed: Vec<String>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, ok: bool, field: &str, rule: &str) -> Self {
        if !ok {
            self.failed.push(format!("{field}: {rule}"));
        }
        self
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "payload request doesn't meet requirement : {}",
                self.failed.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nip_pattern_decides_role() {
        assert_eq!(nip_role("6151202401001"), Some(Role::Admin));
        assert_eq!(nip_role("61522010120012"), Some(Role::Admin));
        assert_eq!(nip_role("3031202401002"), Some(Role::Nurse));
        assert_eq!(nip_role("303220240100234"), Some(Role::Nurse));
    }

    #[test]
    fn malformed_nips_have_no_role() {
        // gender digit
        assert_eq!(nip_role("6153202401001"), None);
        // month 13
        assert_eq!(nip_role("6151202413001"), None);
        // year before 2000
        assert_eq!(nip_role("6151199901001"), None);
        // suffix too short and too long
        assert_eq!(nip_role("615120240100"), None);
        assert_eq!(nip_role("6151202401001234"), None);
        // unknown prefix
        assert_eq!(nip_role("1231202401001"), None);
        assert!(!is_admin_nip("3031202401002"));
        assert!(!is_nurse_nip("6151202401001"));
    }

    #[test]
    fn future_registration_year_is_rejected() {
        let next_year = Utc::now().year() + 1;
        assert_eq!(nip_role(&format!("6151{next_year}01001")), None);
    }

    #[test]
    fn identity_number_must_have_sixteen_digits() {
        assert!(is_valid_identity_number(3201234567890123));
        assert!(!is_valid_identity_number(320123456789012));
        assert!(!is_valid_identity_number(32012345678901234));
        assert!(!is_valid_identity_number(-3201234567890123));
    }

    #[test]
    fn phone_needs_country_code() {
        assert!(is_valid_phone_number("+6281234567"));
        assert!(!is_valid_phone_number("081234567890"));
        assert!(!is_valid_phone_number("+62812"));
        assert!(!is_valid_phone_number("+628123456789012345"));
    }

    #[test]
    fn birth_date_accepts_offsets_and_naive_times() {
        assert!(parse_birth_date("1990-05-01T00:00:00Z").is_some());
        assert!(parse_birth_date("1990-05-01T08:30:00.250+07:00").is_some());
        let naive = parse_birth_date("1990-05-01T10:00:00").unwrap();
        assert_eq!(naive.to_rfc3339(), "1990-05-01T10:00:00+00:00");
        assert!(parse_birth_date("1990-05-01").is_none());
        assert!(parse_birth_date("yesterday").is_none());
    }

    #[test]
    fn only_jpeg_and_png_images() {
        assert_eq!(image_extension("card.JPG").as_deref(), Some("jpg"));
        assert_eq!(image_extension("scan.final.png").as_deref(), Some("png"));
        assert_eq!(image_extension("card.gif"), None);
        assert_eq!(image_extension("card"), None);
    }

    #[test]
    fn checks_collect_every_failure() {
        let err = Checks::new()
            .check(is_valid_name("Al"), "name", "5 to 50 characters")
            .check(is_valid_password("pw"), "password", "5 to 33 characters")
            .check(true, "nip", "unused")
            .finish()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("name: 5 to 50 characters"));
        assert!(msg.contains("password: 5 to 33 characters"));
        assert!(!msg.contains("nip"));
    }
}
