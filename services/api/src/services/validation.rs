//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::album::{AlbumPatch, CreateAlbumRequest};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CLIENT_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Validate album title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Album title is required".to_string());
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!(
            "Album title must be at most {} characters long",
            MAX_TITLE_LEN
        ));
    }

    Ok(())
}

/// Validate client name
pub fn validate_client_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Client name is required".to_string());
    }

    if name.chars().count() > MAX_CLIENT_NAME_LEN {
        return Err(format!(
            "Client name must be at most {} characters long",
            MAX_CLIENT_NAME_LEN
        ));
    }

    Ok(())
}

/// Validate client contact number
pub fn validate_contact_no(contact: &str) -> Result<(), String> {
    if contact.is_empty() {
        return Err("Client contact number is required".to_string());
    }

    static CONTACT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = CONTACT_REGEX
        .get_or_init(|| Regex::new(r"^\d{10}$").expect("Failed to compile contact regex"));

    if !regex.is_match(contact) {
        return Err("Client contact number must be exactly 10 digits".to_string());
    }

    Ok(())
}

pub fn validate_number_of_pages(pages: i32) -> Result<(), String> {
    if pages < 1 {
        return Err("Number of pages must be at least 1".to_string());
    }

    Ok(())
}

/// Validate share description
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "Description must be at most {} characters long",
            MAX_DESCRIPTION_LEN
        ));
    }

    Ok(())
}

/// Fields of a create request once presence has been checked
#[derive(Debug)]
pub struct RequiredAlbumFields {
    pub photographer_id: i64,
    pub album_title: String,
    pub event_type_id: i64,
    pub event_date: chrono::NaiveDate,
    pub client_name: String,
    pub client_contact_no: String,
    pub number_of_pages: i32,
}

/// Validate a create request and extract its required fields
pub fn validate_create(request: &CreateAlbumRequest) -> Result<RequiredAlbumFields, String> {
    let mut missing = Vec::new();
    if request.photographer_id.is_none() {
        missing.push("photographer_id");
    }
    if request.album_title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        missing.push("album_title");
    }
    if request.event_type_id.is_none() {
        missing.push("event_type_id");
    }
    if request.event_date.is_none() {
        missing.push("event_date");
    }
    if request.client_name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        missing.push("client_name");
    }
    if request.client_contact_no.as_deref().is_none_or(str::is_empty) {
        missing.push("client_contactNo");
    }
    if request.number_of_pages.is_none() {
        missing.push("numberOfPages");
    }

    let (
        Some(photographer_id),
        Some(album_title),
        Some(event_type_id),
        Some(event_date),
        Some(client_name),
        Some(client_contact_no),
        Some(number_of_pages),
    ) = (
        request.photographer_id,
        request.album_title.clone().filter(|t| !t.trim().is_empty()),
        request.event_type_id,
        request.event_date,
        request.client_name.clone().filter(|n| !n.trim().is_empty()),
        request.client_contact_no.clone().filter(|c| !c.is_empty()),
        request.number_of_pages,
    )
    else {
        return Err(format!("Missing required fields: {}", missing.join(", ")));
    };

    validate_title(&album_title)?;
    validate_client_name(&client_name)?;
    validate_contact_no(&client_contact_no)?;
    validate_number_of_pages(number_of_pages)?;

    Ok(RequiredAlbumFields {
        photographer_id,
        album_title,
        event_type_id,
        event_date,
        client_name,
        client_contact_no,
        number_of_pages,
    })
}

/// Validate only the fields present in a patch
pub fn validate_patch(patch: &AlbumPatch) -> Result<(), String> {
    if let Some(title) = &patch.album_title {
        validate_title(title)?;
    }
    if let Some(name) = &patch.client_name {
        validate_client_name(name)?;
    }
    if let Some(contact) = &patch.client_contact_no {
        validate_contact_no(contact)?;
    }
    if let Some(pages) = patch.number_of_pages {
        validate_number_of_pages(pages)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn complete_request() -> CreateAlbumRequest {
        CreateAlbumRequest {
            photographer_id: Some(7),
            album_title: Some("Wedding".to_string()),
            event_type_id: Some(1),
            event_date: NaiveDate::from_ymd_opt(2025, 2, 14),
            client_name: Some("Asha".to_string()),
            client_contact_no: Some("9876543210".to_string()),
            number_of_pages: Some(20),
            ..CreateAlbumRequest::default()
        }
    }

    #[test]
    fn test_validate_contact_no() {
        assert!(validate_contact_no("9876543210").is_ok());
        assert!(validate_contact_no("").is_err());
        assert!(validate_contact_no("987654321").is_err());
        assert!(validate_contact_no("98765432100").is_err());
        assert!(validate_contact_no("98765-4321").is_err());
    }

    #[test]
    fn test_validate_lengths() {
        assert!(validate_title(&"a".repeat(200)).is_ok());
        assert!(validate_title(&"a".repeat(201)).is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_client_name(&"b".repeat(101)).is_err());
        assert!(validate_description(&"c".repeat(500)).is_ok());
        assert!(validate_description(&"c".repeat(501)).is_err());
        assert!(validate_number_of_pages(0).is_err());
        assert!(validate_number_of_pages(1).is_ok());
    }

    #[test]
    fn test_validate_create() {
        let fields = validate_create(&complete_request()).unwrap();
        assert_eq!(fields.photographer_id, 7);
        assert_eq!(fields.number_of_pages, 20);

        let request = CreateAlbumRequest {
            album_title: Some(" ".to_string()),
            number_of_pages: None,
            ..complete_request()
        };
        let err = validate_create(&request).unwrap_err();
        assert_eq!(err, "Missing required fields: album_title, numberOfPages");

        let request = CreateAlbumRequest {
            client_name: Some("  ".to_string()),
            ..complete_request()
        };
        let err = validate_create(&request).unwrap_err();
        assert_eq!(err, "Missing required fields: client_name");

        let request = CreateAlbumRequest {
            client_contact_no: Some("12345".to_string()),
            ..complete_request()
        };
        assert!(validate_create(&request).is_err());
    }

    #[test]
    fn test_validate_patch_checks_present_fields_only() {
        assert!(validate_patch(&AlbumPatch::default()).is_ok());

        let patch = AlbumPatch {
            number_of_pages: Some(0),
            ..AlbumPatch::default()
        };
        assert!(validate_patch(&patch).is_err());
    }
}
