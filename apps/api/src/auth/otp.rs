use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const OTP_TTL_MINUTES: i64 = 10;

/// Six-digit numeric code in `100000..=999999`.
pub fn generate_otp() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

pub fn otp_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(OTP_TTL_MINUTES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    NotRequested,
    Expired,
    Invalid,
}

impl OtpRejection {
    pub fn message(self) -> &'static str {
        match self {
            OtpRejection::NotRequested => "No OTP request found. Please request a new OTP.",
            OtpRejection::Expired => "OTP has expired. Please request a new one.",
            OtpRejection::Invalid => "Invalid OTP",
        }
    }
}

/// Checks that a reset request exists and is still live, returning the
/// stored hash to compare against.
pub fn pending_otp<'a>(
    hash: Option<&'a str>,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<&'a str, OtpRejection> {
    let (Some(hash), Some(expires_at)) = (hash, expires_at) else {
        return Err(OtpRejection::NotRequested);
    };
    if now > expires_at {
        return Err(OtpRejection::Expired);
    }
    Ok(hash)
}
