use reqwest::multipart::{Form, Part};

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

/// Ordered multipart body.
///
/// Kept as plain data until dispatch so callers and tests can see exactly
/// which fields go on the wire; repeated names are preserved in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Appends the field only when a value is present.
    pub fn text_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.text(name, v.to_string()),
            None => self,
        }
    }

    /// One entry per value, all under the same name.
    pub fn repeated<I, V>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        values.into_iter().fold(self, |form, v| form.text(name, v))
    }

    pub fn file(mut self, name: &str, file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            value: PartValue::File {
                file_name: file_name.into(),
                mime: mime.into(),
                bytes,
            },
        });
        self
    }

    pub fn fields(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }

    /// Text values recorded under `name`, in insertion order.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|p| p.name == name)
            .filter_map(|p| match &p.value {
                PartValue::Text(v) => Some(v.as_str()),
                PartValue::File { .. } => None,
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn to_reqwest(&self) -> Result<Form> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match &part.value {
                PartValue::Text(v) => form.text(part.name.clone(), v.clone()),
                PartValue::File { file_name, mime, bytes } => {
                    let file_part = Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime)
                        .map_err(|e| ApiError::InvalidRequest(format!("invalid mime type {mime}: {e}")))?;
                    form.part(part.name.clone(), file_part)
                }
            };
        }
        Ok(form)
    }
}
