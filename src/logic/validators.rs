use crate::logic::typing::TypingDebounce;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const VALIDATOR_LIST_METHOD: &str = "validatorList";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub id: Address,
    pub name: String,
    #[serde(default, rename = "logoURI")]
    pub logo_uri: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Wire shape of the validator list document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorListFile {
    pub validators: Vec<ValidatorInfo>,
}

/// Known validators with lookup by lowercase hex address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorList {
    validators: Vec<ValidatorInfo>,
    dictionary: HashMap<String, usize>,
}

impl ValidatorList {
    pub fn new(validators: Vec<ValidatorInfo>) -> Self {
        let dictionary = validators.iter().enumerate().map(|(i, validator)| (format!("{:#x}", validator.id), i)).collect();
        Self { validators, dictionary }
    }

    pub fn validators(&self) -> &[ValidatorInfo] {
        &self.validators
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Lookup by hex address in any letter case.
    pub fn get(&self, address: &str) -> Option<&ValidatorInfo> {
        self.dictionary.get(&address.to_lowercase()).map(|&i| &self.validators[i])
    }

    pub fn get_by_address(&self, address: Address) -> Option<&ValidatorInfo> {
        self.dictionary.get(&format!("{address:#x}")).map(|&i| &self.validators[i])
    }

    pub fn contains(&self, address: Address) -> bool {
        self.get_by_address(address).is_some()
    }

    /// Validators whose name or address contains `keyword`, ignoring case. A blank keyword matches all.
    pub fn search(&self, keyword: &str) -> Vec<&ValidatorInfo> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return self.validators.iter().collect();
        }
        self.validators
            .iter()
            .filter(|validator| validator.name.to_lowercase().contains(&keyword) || format!("{:#x}", validator.id).contains(&keyword))
            .collect()
    }
}

impl From<ValidatorListFile> for ValidatorList {
    fn from(file: ValidatorListFile) -> Self {
        Self::new(file.validators)
    }
}

/// Search box state over a validator list.
///
/// While the user is typing, results keep using the last settled keyword.
pub struct ValidatorSearch {
    keyword: String,
    settled: String,
    debounce: Arc<TypingDebounce>,
}

impl ValidatorSearch {
    pub fn new(debounce: Arc<TypingDebounce>) -> Self {
        Self { keyword: String::new(), settled: String::new(), debounce }
    }

    pub fn on_input(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
        self.debounce.touch();
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn is_typing(&self) -> bool {
        self.debounce.is_active()
    }

    pub fn debounce(&self) -> &Arc<TypingDebounce> {
        &self.debounce
    }

    pub fn effective_keyword(&mut self) -> &str {
        if !self.debounce.is_active() && self.settled != self.keyword {
            self.settled.clone_from(&self.keyword);
        }
        &self.settled
    }

    pub fn results<'a>(&mut self, list: &'a ValidatorList) -> Vec<&'a ValidatorInfo> {
        let keyword = self.effective_keyword().to_string();
        list.search(&keyword)
    }
}
