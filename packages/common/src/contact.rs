//! Contact channel validation and outbound link construction.
//!
//! Every function here reports an unusable value as `None`/`false` rather than
//! an error, so callers can show one generic "invalid contact" message.

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Country calling code prepended to canonical phone numbers.
pub const COUNTRY_CODE: &str = "91";

/// Base URL of the messaging deep link used for phone channels.
pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

const NATIONAL_NUMBER_LEN: usize = 10;

/// Kind of contact channel an item owner can disclose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "whatsapp"))]
    Whatsapp,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "email"))]
    Email,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A phone number in canonical `91XXXXXXXXXX` form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Canonical form including the country code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a user-entered mobile number.
///
/// Accepts the bare national number, a single trunk `0`, the `91` country
/// code and the `0091` international prefix, with any punctuation. The
/// national part must be ten digits starting with 6-9.
pub fn normalize_phone(raw: &str) -> Option<NormalizedPhone> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    let international = digits
        .strip_prefix("00")
        .and_then(|d| d.strip_prefix(COUNTRY_CODE));

    let national = if let Some(rest) = international {
        rest
    } else if digits.len() == COUNTRY_CODE.len() + NATIONAL_NUMBER_LEN {
        digits.strip_prefix(COUNTRY_CODE)?
    } else if digits.len() == NATIONAL_NUMBER_LEN + 1 {
        digits.strip_prefix('0')?
    } else {
        digits.as_str()
    };

    let valid = national.len() == NATIONAL_NUMBER_LEN
        && matches!(national.as_bytes()[0], b'6'..=b'9');
    valid.then(|| NormalizedPhone(format!("{COUNTRY_CODE}{national}")))
}

/// Conservative single-`@` address check. Not RFC 5322.
pub fn validate_email(raw: &str) -> bool {
    let email = raw.trim();
    if email.is_empty() || email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Subject and body of a pre-filled outbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub subject: String,
    pub body: String,
}

/// A validated, normalized contact channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContactChannel {
    Whatsapp(NormalizedPhone),
    Email(String),
}

impl ContactChannel {
    /// Validate and normalize `raw` for the given channel type.
    pub fn parse(contact_type: ContactType, raw: &str) -> Option<Self> {
        match contact_type {
            ContactType::Whatsapp => normalize_phone(raw).map(Self::Whatsapp),
            ContactType::Email => {
                validate_email(raw).then(|| Self::Email(raw.trim().to_string()))
            }
        }
    }

    pub fn contact_type(&self) -> ContactType {
        match self {
            Self::Whatsapp(_) => ContactType::Whatsapp,
            Self::Email(_) => ContactType::Email,
        }
    }

    /// The value as persisted and shown to the counterpart.
    pub fn value(&self) -> &str {
        match self {
            Self::Whatsapp(phone) => phone.as_str(),
            Self::Email(address) => address,
        }
    }

    /// Build the URI a person opens to send `message` over this channel.
    ///
    /// Phone channels carry only the body; the subject is folded in as its
    /// first line.
    pub fn link(&self, message: &OutboundMessage) -> String {
        match self {
            Self::Whatsapp(phone) => {
                let text = if message.subject.is_empty() {
                    message.body.clone()
                } else {
                    format!("{}\n\n{}", message.subject, message.body)
                };
                format!(
                    "{WHATSAPP_BASE_URL}{}?text={}",
                    phone.as_str(),
                    urlencoding::encode(&text)
                )
            }
            Self::Email(address) => format!(
                "mailto:{}?subject={}&body={}",
                address,
                urlencoding::encode(&message.subject),
                urlencoding::encode(&message.body)
            ),
        }
    }
}

/// Build an outbound contact link, or `None` when `value` is absent or not
/// valid for the channel.
pub fn build_contact_link(
    contact_type: ContactType,
    value: Option<&str>,
    message: &OutboundMessage,
) -> Option<String> {
    let value = value.filter(|v| !v.trim().is_empty())?;
    ContactChannel::parse(contact_type, value).map(|channel| channel.link(message))
}
