use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid override '{0}'. Expected 'SLOT.KEY=VALUE' (e.g., 'bond.MU=0.5').")]
    InvalidOverrideFormat(String),

    #[error("Unknown model slot '{0}'. Expected 'contact', 'bond' or 'field.<index>'.")]
    UnknownSlot(String),

    #[error("Value '{value}' for '{key}' is not a number.")]
    InvalidValue { key: String, value: String },

    #[error("Component '{component}' cannot be empty in override '{text}'.")]
    EmptyComponent {
        component: &'static str,
        text: String,
    },
}

/// Which configured model an override targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSlot {
    Contact,
    Bond,
    Field(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterOverride {
    pub slot: ModelSlot,
    pub key: String,
    pub value: f64,
}

pub fn parse_override(text: &str) -> Result<ParameterOverride, ParseError> {
    let (target, value) = text
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidOverrideFormat(text.to_string()))?;
    let (slot, key) = target
        .trim()
        .rsplit_once('.')
        .ok_or_else(|| ParseError::InvalidOverrideFormat(text.to_string()))?;

    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            text: text.to_string(),
        });
    }
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "value",
            text: text.to_string(),
        });
    }

    let slot = match slot.to_ascii_lowercase().as_str() {
        "contact" => ModelSlot::Contact,
        "bond" => ModelSlot::Bond,
        other => other
            .strip_prefix("field.")
            .and_then(|index| index.parse().ok())
            .map(ModelSlot::Field)
            .ok_or_else(|| ParseError::UnknownSlot(slot.to_string()))?,
    };
    let value = value.parse::<f64>().map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })?;

    Ok(ParameterOverride {
        slot,
        key: key.to_string(),
        value,
    })
}
