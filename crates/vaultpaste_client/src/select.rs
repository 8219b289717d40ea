//! Custom single-selection dropdowns.
//!
//! A [`SelectGroup`] owns every dropdown on a page. At most one instance is
//! open at a time. Only pointer activation drives transitions; there is no
//! keyboard model.

use vaultpaste_core::models::Language;
use vaultpaste_core::DEFAULT_EXPIRY_MINUTES;

/// Name of the language dropdown on the create form.
pub const LANGUAGE_SELECT: &str = "language";
/// Name of the expiry dropdown on the create form.
pub const EXPIRY_SELECT: &str = "expiry-time";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
    pub icon: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    fn label(&self) -> TriggerLabel {
        TriggerLabel {
            icon: self.icon.clone(),
            text: self.text.clone(),
        }
    }
}

/// What the closed dropdown shows: icon plus text, or text only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerLabel {
    pub icon: Option<String>,
    pub text: String,
}

/// One dropdown instance bound to a hidden form value.
#[derive(Debug, Clone)]
pub struct CustomSelect {
    name: String,
    options: Vec<SelectOption>,
    selected_value: String,
    label: TriggerLabel,
    open: bool,
}

impl CustomSelect {
    /// Build a closed dropdown with `default_value` selected.
    ///
    /// An unknown default falls back to the first option.
    pub fn new(name: impl Into<String>, options: Vec<SelectOption>, default_value: &str) -> Self {
        let initial = options
            .iter()
            .find(|option| option.value == default_value)
            .or_else(|| options.first());
        let (selected_value, label) = match initial {
            Some(option) => (option.value.clone(), option.label()),
            None => (
                String::new(),
                TriggerLabel {
                    icon: None,
                    text: String::new(),
                },
            ),
        };
        Self {
            name: name.into(),
            options,
            selected_value,
            label,
            open: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.selected_value
    }

    pub fn label(&self) -> &TriggerLabel {
        &self.label
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }
}

/// Language picker with icons.
pub fn language_select() -> CustomSelect {
    let options = Language::ALL
        .into_iter()
        .map(|lang| {
            let option = SelectOption::new(lang.as_str(), lang.display_name());
            match lang.icon_class() {
                Some(icon) => option.with_icon(icon),
                None => option,
            }
        })
        .collect();
    CustomSelect::new(LANGUAGE_SELECT, options, Language::default().as_str())
}

/// Expiry picker; values are minutes, text only.
pub fn expiry_select() -> CustomSelect {
    let options = vec![
        SelectOption::new("10", "10 Minutes"),
        SelectOption::new("60", "1 Hour"),
        SelectOption::new("360", "6 Hours"),
        SelectOption::new("1440", "1 Day"),
        SelectOption::new("10080", "1 Week"),
    ];
    CustomSelect::new(
        EXPIRY_SELECT,
        options,
        &DEFAULT_EXPIRY_MINUTES.to_string(),
    )
}

/// Sibling dropdowns sharing the single-open invariant.
#[derive(Debug, Clone, Default)]
pub struct SelectGroup {
    selects: Vec<CustomSelect>,
}

impl SelectGroup {
    pub fn new(selects: Vec<CustomSelect>) -> Self {
        Self { selects }
    }

    /// The create form's language and expiry dropdowns.
    pub fn create_form() -> Self {
        Self::new(vec![language_select(), expiry_select()])
    }

    pub fn get(&self, name: &str) -> Option<&CustomSelect> {
        self.selects.iter().find(|select| select.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(CustomSelect::value)
    }

    /// Name of the open instance, if any.
    pub fn open_instance(&self) -> Option<&str> {
        self.selects
            .iter()
            .find(|select| select.open)
            .map(|select| select.name.as_str())
    }

    /// Toggle `name` and close every sibling.
    ///
    /// # Returns
    /// `false` when no instance has that name (nothing changes).
    pub fn click_trigger(&mut self, name: &str) -> bool {
        if self.get(name).is_none() {
            return false;
        }
        for select in &mut self.selects {
            if select.name == name {
                select.open = !select.open;
            } else {
                select.open = false;
            }
        }
        true
    }

    /// Pick `value` in the open instance `name`, then close it.
    ///
    /// # Returns
    /// `false` when the instance is unknown or closed, or has no such option.
    pub fn click_option(&mut self, name: &str, value: &str) -> bool {
        let Some(select) = self.selects.iter_mut().find(|select| select.name == name) else {
            return false;
        };
        if !select.open {
            return false;
        }
        let Some(option) = select.options.iter().find(|option| option.value == value) else {
            return false;
        };
        select.label = option.label();
        select.selected_value = option.value.clone();
        select.open = false;
        true
    }

    /// A click outside every instance closes them all.
    pub fn click_outside(&mut self) {
        for select in &mut self.selects {
            select.open = false;
        }
    }

    /// Open `name` and choose `value` in one step.
    ///
    /// # Returns
    /// `false` when the instance or option does not exist.
    pub fn choose(&mut self, name: &str, value: &str) -> bool {
        if self.get(name).is_some_and(|select| select.is_open()) {
            return self.click_option(name, value);
        }
        self.click_trigger(name) && self.click_option(name, value)
    }
}
