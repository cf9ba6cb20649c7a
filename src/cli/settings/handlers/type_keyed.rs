//! Per-message-type boolean settings (`hidden`, `full-height`).

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{format_bool, mutate_config, parse_bool, parse_type};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::Config;
use crate::core::message::MessageType;
use crate::core::prefs::PreferenceField;

/// Handler for one [`PreferenceField`] keyed by message type.
pub struct TypeFieldHandler {
    key: &'static str,
    field: PreferenceField,
    hint: &'static str,
    example: &'static str,
}

impl SettingHandler for TypeFieldHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let [ty, value @ ..] = args else {
            return Err(self.missing_args());
        };
        if value.is_empty() {
            return Err(self.missing_args());
        }

        let ty = parse_type(ty)?;
        let input = value.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        let field = self.field;

        mutate_config(ctx.orchestrator, move |config| {
            config.set_type_field(ty, field, value);
            Ok(())
        })?;

        Ok(format!(
            "✅ Set {} for {} messages to: {}",
            self.key,
            ty,
            format_bool(value)
        ))
    }

    /// Without a type, clears the field for every type.
    fn unset(&self, args: Option<&str>, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let field = self.field;
        match args {
            Some(ty) => {
                let ty = parse_type(ty)?;
                mutate_config(ctx.orchestrator, move |config| {
                    config.set_type_field(ty, field, false);
                    Ok(())
                })?;
                Ok(format!("✅ Unset {} for {} messages", self.key, ty))
            }
            None => {
                mutate_config(ctx.orchestrator, move |config| {
                    for ty in MessageType::ALL {
                        config.set_type_field(ty, field, false);
                    }
                    Ok(())
                })?;
                Ok(format!("✅ Unset {} for all message types", self.key))
            }
        }
    }

    fn format(&self, config: &Config) -> String {
        let enabled: Vec<&str> = MessageType::ALL
            .iter()
            .filter(|ty| self.field.read(config.type_preference(**ty)))
            .map(|ty| ty.as_str())
            .collect();
        if enabled.is_empty() {
            format!("  {}: (none)", self.key)
        } else {
            format!("  {}: {}", self.key, enabled.join(", "))
        }
    }
}

impl TypeFieldHandler {
    fn missing_args(&self) -> SettingError {
        SettingError::MissingArgs {
            hint: self.hint,
            example: self.example,
        }
    }
}

/// Create a handler for the `hidden` setting.
pub fn hidden_handler() -> TypeFieldHandler {
    TypeFieldHandler {
        key: "hidden",
        field: PreferenceField::Hidden,
        hint: "To collapse a message type to its preview, specify the type and on or off:",
        example: "scrollfold set hidden tool on",
    }
}

/// Create a handler for the `full-height` setting.
pub fn full_height_handler() -> TypeFieldHandler {
    TypeFieldHandler {
        key: "full-height",
        field: PreferenceField::FullHeight,
        hint: "To show a message type at its natural height, specify the type and on or off:",
        example: "scrollfold set full-height code_exe on",
    }
}
