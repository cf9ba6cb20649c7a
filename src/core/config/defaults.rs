use crate::core::config::data::Config;
use crate::core::message::MessageType;
use crate::core::prefs::{PreferenceField, TypePreference};

/// Cell height assumed when neither the terminal nor the config report one.
pub const DEFAULT_CELL_HEIGHT_PX: u16 = 16;

impl Config {
    pub fn type_preference(&self, ty: MessageType) -> TypePreference {
        self.display.types.get(&ty).copied().unwrap_or_default()
    }

    pub fn set_type_field(&mut self, ty: MessageType, field: PreferenceField, value: bool) {
        let pref = self.display.types.entry(ty).or_default();
        match field {
            PreferenceField::Hidden => pref.hidden = value,
            PreferenceField::FullHeight => pref.full_height = value,
        }
        if *pref == TypePreference::default() {
            self.display.types.remove(&ty);
        }
    }

    pub fn fixed_height(&self) -> bool {
        self.display.fixed_height.unwrap_or(true)
    }

    pub fn cell_height(&self) -> u16 {
        self.cell_height
            .filter(|height| *height > 0)
            .unwrap_or(DEFAULT_CELL_HEIGHT_PX)
    }
}
