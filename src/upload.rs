use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};

const DEFAULT_MIME_TYPE: &str = "image/jpeg";
const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const SUPPORTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl UploadedImage {
    /// Dashboard uploads are limited to jpg, jpeg and png.
    pub fn is_supported(&self) -> bool {
        let by_extension = self
            .file_name
            .as_deref()
            .and_then(extension)
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));

        by_extension || SUPPORTED_MIME_TYPES.contains(&self.mime_type.as_str())
    }
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub image: Option<UploadedImage>,
    pub fields: HashMap<String, String>,
}

/// Reads a multipart body. The first file field becomes the image; text
/// fields are collected by name. A file field with no name and no bytes is
/// what browsers send when nothing was picked, so it counts as no file.
pub async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            form.fields.insert(name, value);
            continue;
        };

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        if form.image.is_some() || (file_name.is_empty() && data.is_empty()) {
            continue;
        }

        form.image = Some(UploadedImage {
            mime_type: mime_type_for(&file_name, content_type.as_deref()),
            file_name: Some(file_name).filter(|f| !f.is_empty()),
            data: data.to_vec(),
        });
    }

    Ok(form)
}

fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Prefers the declared image type, then the file extension.
pub fn mime_type_for(file_name: &str, content_type: Option<&str>) -> String {
    if let Some(ct) = content_type.filter(|ct| ct.starts_with("image/")) {
        return ct.to_string();
    }

    match extension(file_name).as_deref() {
        Some("png") => "image/png".to_string(),
        Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
        Some("webp") => "image/webp".to_string(),
        _ => content_type.unwrap_or(DEFAULT_MIME_TYPE).to_string(),
    }
}
