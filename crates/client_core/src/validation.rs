//! Field addressing and client-side validation for the user form.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use shared::domain::UserDraft;
use thiserror::Error;

/// Loose `local@domain.tld` shape, unanchored.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("Invalid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Website,
    CompanyName,
    CompanyCatchPhrase,
    CompanyBs,
    AddressStreet,
    AddressSuite,
    AddressCity,
    AddressZipcode,
    AddressGeoLat,
    AddressGeoLng,
}

impl FormField {
    pub const ALL: [FormField; 13] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Website,
        Self::CompanyName,
        Self::CompanyCatchPhrase,
        Self::CompanyBs,
        Self::AddressStreet,
        Self::AddressSuite,
        Self::AddressCity,
        Self::AddressZipcode,
        Self::AddressGeoLat,
        Self::AddressGeoLng,
    ];

    /// Dotted input name, e.g. `company.catchPhrase`.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::CompanyName => "company.name",
            Self::CompanyCatchPhrase => "company.catchPhrase",
            Self::CompanyBs => "company.bs",
            Self::AddressStreet => "address.street",
            Self::AddressSuite => "address.suite",
            Self::AddressCity => "address.city",
            Self::AddressZipcode => "address.zipcode",
            Self::AddressGeoLat => "address.geo.lat",
            Self::AddressGeoLng => "address.geo.lng",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Self::Name | Self::Email | Self::Phone | Self::Website)
    }

    pub fn value(self, draft: &UserDraft) -> &str {
        match self {
            Self::Name => &draft.name,
            Self::Email => &draft.email,
            Self::Phone => &draft.phone,
            Self::Website => &draft.website,
            Self::CompanyName => &draft.company.name,
            Self::CompanyCatchPhrase => &draft.company.catch_phrase,
            Self::CompanyBs => &draft.company.bs,
            Self::AddressStreet => &draft.address.street,
            Self::AddressSuite => &draft.address.suite,
            Self::AddressCity => &draft.address.city,
            Self::AddressZipcode => &draft.address.zipcode,
            Self::AddressGeoLat => &draft.address.geo.lat,
            Self::AddressGeoLng => &draft.address.geo.lng,
        }
    }

    pub fn set(self, draft: &mut UserDraft, value: String) {
        let slot = match self {
            Self::Name => &mut draft.name,
            Self::Email => &mut draft.email,
            Self::Phone => &mut draft.phone,
            Self::Website => &mut draft.website,
            Self::CompanyName => &mut draft.company.name,
            Self::CompanyCatchPhrase => &mut draft.company.catch_phrase,
            Self::CompanyBs => &mut draft.company.bs,
            Self::AddressStreet => &mut draft.address.street,
            Self::AddressSuite => &mut draft.address.suite,
            Self::AddressCity => &mut draft.address.city,
            Self::AddressZipcode => &mut draft.address.zipcode,
            Self::AddressGeoLat => &mut draft.address.geo.lat,
            Self::AddressGeoLng => &mut draft.address.geo.lng,
        };
        *slot = value;
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| UnknownField(key.to_string()))
    }
}

/// Per-field validation messages, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<FormField, &'static str>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.fields.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &'static str)> + '_ {
        self.fields.iter().map(|(field, message)| (*field, *message))
    }

    pub fn clear(&mut self, field: FormField) -> bool {
        self.fields.remove(&field).is_some()
    }

    fn insert(&mut self, field: FormField, message: &'static str) {
        self.fields.insert(field, message);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid user form")?;
        for (index, (field, message)) in self.iter().enumerate() {
            let sep = if index == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_draft(draft: &UserDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if draft.name.trim().is_empty() {
        errors.insert(FormField::Name, "Name is required");
    }

    if draft.email.trim().is_empty() {
        errors.insert(FormField::Email, "Email is required");
    } else if !EMAIL_SHAPE.is_match(&draft.email) {
        errors.insert(FormField::Email, "Email is invalid");
    }

    if draft.phone.trim().is_empty() {
        errors.insert(FormField::Phone, "Phone is required");
    }

    if draft.website.trim().is_empty() {
        errors.insert(FormField::Website, "Website is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
