//! CREATE_CONFIG and MODIFY_CONFIG.
//!
//! CREATE_CONFIG accepts either a name (plus optional copy source) or a
//! full GET_CONFIGS_RESPONSE payload: the exporter's own grammar reused
//! on the write path. Inside that payload unknown elements are read
//! over, so output from newer exporters imports cleanly.

use omp_core::event::Attrs;

use crate::command::{
    Command, ConfigPreferenceChange, CreateConfig, FamilyChoice, FamilySelectionChange,
    ImportConfig, ImportNvtSelector, ImportPreference, ModifyConfig, NvtSelectionChange,
};

use super::{append, ElementParser, EndResult, StartResult};

// =============================================================================
// CREATE_CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateState {
    Root,
    Name,
    Comment,
    Copy,
    /// Inside <get_configs_response>.
    Import,
    IConfig,
    IName,
    IComment,
    IPreferences,
    IPreference,
    IPrefName,
    IPrefNvt,
    IPrefNvtName,
    IPrefValue,
    INvtSelectors,
    INvtSelector,
    ISelName,
    ISelInclude,
    ISelType,
    ISelFamilyOrNvt,
}

impl CreateState {
    fn in_import(self) -> bool {
        !matches!(
            self,
            CreateState::Root | CreateState::Name | CreateState::Comment | CreateState::Copy
        )
    }
}

pub struct CreateConfigParser {
    state: CreateState,
    data: CreateConfig,
    /// Text buffers for typed selector fields, parsed at element close.
    include_buf: String,
    type_buf: String,
}

impl CreateConfigParser {
    pub fn new() -> Self {
        CreateConfigParser {
            state: CreateState::Root,
            data: CreateConfig::default(),
            include_buf: String::new(),
            type_buf: String::new(),
        }
    }

    fn import_mut(&mut self) -> &mut ImportConfig {
        // The subtree open initialized this; reaching an import state
        // without it would be an engine bug.
        self.data.import.get_or_insert_with(ImportConfig::default)
    }

    fn current_preference_mut(&mut self) -> Option<&mut ImportPreference> {
        self.import_mut().preferences.last_mut()
    }

    fn current_selector_mut(&mut self) -> Option<&mut ImportNvtSelector> {
        self.import_mut().nvt_selectors.last_mut()
    }
}

impl ElementParser for CreateConfigParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (CreateState::Root, "name") => CreateState::Name,
            (CreateState::Root, "comment") => CreateState::Comment,
            (CreateState::Root, "copy") => CreateState::Copy,
            (CreateState::Root, "get_configs_response") => {
                self.data.import = Some(ImportConfig::default());
                CreateState::Import
            }
            (CreateState::Import, "config") => CreateState::IConfig,
            (CreateState::IConfig, "name") => CreateState::IName,
            (CreateState::IConfig, "comment") => CreateState::IComment,
            (CreateState::IConfig, "preferences") => CreateState::IPreferences,
            (CreateState::IPreferences, "preference") => {
                self.import_mut()
                    .preferences
                    .push(ImportPreference::default());
                CreateState::IPreference
            }
            (CreateState::IPreference, "name") => CreateState::IPrefName,
            (CreateState::IPreference, "nvt") => {
                let oid = attrs.get_owned("oid");
                if let Some(preference) = self.current_preference_mut() {
                    preference.nvt_oid = oid;
                }
                CreateState::IPrefNvt
            }
            (CreateState::IPrefNvt, "name") => CreateState::IPrefNvtName,
            (CreateState::IPreference, "value") => CreateState::IPrefValue,
            (CreateState::IConfig, "nvt_selectors") => CreateState::INvtSelectors,
            (CreateState::INvtSelectors, "nvt_selector") => {
                self.import_mut()
                    .nvt_selectors
                    .push(ImportNvtSelector::default());
                self.include_buf.clear();
                self.type_buf.clear();
                CreateState::INvtSelector
            }
            (CreateState::INvtSelector, "name") => CreateState::ISelName,
            (CreateState::INvtSelector, "include") => CreateState::ISelInclude,
            (CreateState::INvtSelector, "type") => CreateState::ISelType,
            (CreateState::INvtSelector, "family_or_nvt") => CreateState::ISelFamilyOrNvt,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            CreateState::Name => append(&mut self.data.name, text),
            CreateState::Comment => append(&mut self.data.comment, text),
            CreateState::Copy => append(&mut self.data.copy, text),
            CreateState::IName => append(&mut self.import_mut().name, text),
            CreateState::IComment => append(&mut self.import_mut().comment, text),
            CreateState::IPrefName => {
                if let Some(preference) = self.current_preference_mut() {
                    preference.name.push_str(text);
                }
            }
            CreateState::IPrefNvtName => {
                let text = text.to_owned();
                if let Some(preference) = self.current_preference_mut() {
                    append(&mut preference.nvt_name, &text);
                }
            }
            CreateState::IPrefValue => {
                if let Some(preference) = self.current_preference_mut() {
                    preference.value.push_str(text);
                }
            }
            CreateState::ISelName => {
                if let Some(selector) = self.current_selector_mut() {
                    selector.name.push_str(text);
                }
            }
            CreateState::ISelInclude => self.include_buf.push_str(text),
            CreateState::ISelType => self.type_buf.push_str(text),
            CreateState::ISelFamilyOrNvt => {
                if let Some(selector) = self.current_selector_mut() {
                    selector.family_or_nvt.push_str(text);
                }
            }
            _ => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            CreateState::Root => {
                return EndResult::Complete(Command::CreateConfig(std::mem::take(&mut self.data)))
            }
            CreateState::Name | CreateState::Comment | CreateState::Copy | CreateState::Import => {
                CreateState::Root
            }
            CreateState::IConfig => CreateState::Import,
            CreateState::IName | CreateState::IComment => CreateState::IConfig,
            CreateState::IPreferences => CreateState::IConfig,
            CreateState::IPreference => CreateState::IPreferences,
            CreateState::IPrefName | CreateState::IPrefNvt | CreateState::IPrefValue => {
                CreateState::IPreference
            }
            CreateState::IPrefNvtName => CreateState::IPrefNvt,
            CreateState::INvtSelectors => CreateState::IConfig,
            CreateState::INvtSelector => {
                let include = self.include_buf.trim() == "1";
                let selector_type = self.type_buf.trim().parse().unwrap_or(0);
                if let Some(selector) = self.current_selector_mut() {
                    selector.include = include;
                    selector.selector_type = selector_type;
                }
                CreateState::INvtSelectors
            }
            CreateState::ISelName
            | CreateState::ISelInclude
            | CreateState::ISelType
            | CreateState::ISelFamilyOrNvt => CreateState::INvtSelector,
        };
        EndResult::Open
    }

    fn importing(&self) -> bool {
        self.state.in_import()
    }
}

// =============================================================================
// MODIFY_CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifyState {
    Root,
    Preference,
    PrefName,
    PrefNvt,
    PrefValue,
    NvtSelection,
    SelFamily,
    SelNvt,
    FamilySelection,
    FsGrowing,
    Family,
    FamName,
    FamAll,
    FamGrowing,
}

pub struct ModifyConfigParser {
    state: ModifyState,
    data: ModifyConfig,
    bool_buf: String,
}

impl ModifyConfigParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyConfigParser {
            state: ModifyState::Root,
            data: ModifyConfig {
                config_id: attrs.get_owned("config_id"),
                ..ModifyConfig::default()
            },
            bool_buf: String::new(),
        }
    }

    fn family_selection_mut(&mut self) -> &mut FamilySelectionChange {
        self.data
            .family_selection
            .get_or_insert_with(FamilySelectionChange::default)
    }
}

impl ElementParser for ModifyConfigParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (ModifyState::Root, "preference") => {
                self.data.preference = Some(ConfigPreferenceChange::default());
                ModifyState::Preference
            }
            (ModifyState::Preference, "name") => ModifyState::PrefName,
            (ModifyState::Preference, "nvt") => {
                if let Some(preference) = self.data.preference.as_mut() {
                    preference.nvt_oid = attrs.get_owned("oid");
                }
                ModifyState::PrefNvt
            }
            (ModifyState::Preference, "value") => ModifyState::PrefValue,
            (ModifyState::Root, "nvt_selection") => {
                self.data.nvt_selection = Some(NvtSelectionChange::default());
                ModifyState::NvtSelection
            }
            (ModifyState::NvtSelection, "family") => ModifyState::SelFamily,
            (ModifyState::NvtSelection, "nvt") => {
                if let Some(selection) = self.data.nvt_selection.as_mut() {
                    if let Some(oid) = attrs.get_owned("oid") {
                        selection.nvt_oids.push(oid);
                    }
                }
                ModifyState::SelNvt
            }
            (ModifyState::Root, "family_selection") => {
                self.data.family_selection = Some(FamilySelectionChange::default());
                ModifyState::FamilySelection
            }
            (ModifyState::FamilySelection, "growing") => {
                self.bool_buf.clear();
                ModifyState::FsGrowing
            }
            (ModifyState::FamilySelection, "family") => {
                self.family_selection_mut()
                    .families
                    .push(FamilyChoice::default());
                ModifyState::Family
            }
            (ModifyState::Family, "name") => ModifyState::FamName,
            (ModifyState::Family, "all") => {
                self.bool_buf.clear();
                ModifyState::FamAll
            }
            (ModifyState::Family, "growing") => {
                self.bool_buf.clear();
                ModifyState::FamGrowing
            }
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            ModifyState::PrefName => {
                if let Some(preference) = self.data.preference.as_mut() {
                    append(&mut preference.name, text);
                }
            }
            ModifyState::PrefValue => {
                if let Some(preference) = self.data.preference.as_mut() {
                    append(&mut preference.value, text);
                }
            }
            ModifyState::SelFamily => {
                if let Some(selection) = self.data.nvt_selection.as_mut() {
                    append(&mut selection.family, text);
                }
            }
            ModifyState::FamName => {
                let text = text.to_owned();
                if let Some(family) = self.family_selection_mut().families.last_mut() {
                    append(&mut family.name, &text);
                }
            }
            ModifyState::FsGrowing | ModifyState::FamAll | ModifyState::FamGrowing => {
                self.bool_buf.push_str(text);
            }
            _ => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            ModifyState::Root => {
                return EndResult::Complete(Command::ModifyConfig(std::mem::take(&mut self.data)))
            }
            ModifyState::Preference | ModifyState::NvtSelection | ModifyState::FamilySelection => {
                ModifyState::Root
            }
            ModifyState::PrefName | ModifyState::PrefNvt | ModifyState::PrefValue => {
                ModifyState::Preference
            }
            ModifyState::SelFamily | ModifyState::SelNvt => ModifyState::NvtSelection,
            ModifyState::FsGrowing => {
                let growing = self.bool_buf.trim() == "1";
                self.family_selection_mut().growing = growing;
                ModifyState::FamilySelection
            }
            ModifyState::Family => ModifyState::FamilySelection,
            ModifyState::FamName => ModifyState::Family,
            ModifyState::FamAll => {
                let all = self.bool_buf.trim() == "1";
                if let Some(family) = self.family_selection_mut().families.last_mut() {
                    family.all = all;
                }
                ModifyState::Family
            }
            ModifyState::FamGrowing => {
                let growing = self.bool_buf.trim() == "1";
                if let Some(family) = self.family_selection_mut().families.last_mut() {
                    family.growing = growing;
                }
                ModifyState::Family
            }
        };
        EndResult::Open
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_create_with_copy() {
        let mut parser = CreateConfigParser::new();
        parser.start_element("name", &Attrs::default());
        parser.text("Fast scan");
        parser.end_element("name");
        parser.start_element("copy", &Attrs::default());
        parser.text("c-base");
        parser.end_element("copy");
        assert!(!parser.importing());
        match parser.end_element("create_config") {
            EndResult::Complete(Command::CreateConfig(data)) => {
                assert_eq!(data.name.as_deref(), Some("Fast scan"));
                assert_eq!(data.copy.as_deref(), Some("c-base"));
                assert!(data.import.is_none());
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn import_subtree_sets_importing() {
        let mut parser = CreateConfigParser::new();
        parser.start_element("get_configs_response", &Attrs::default());
        assert!(parser.importing());
        parser.start_element("config", &Attrs::default());
        parser.start_element("name", &Attrs::default());
        parser.text("Imported");
        parser.end_element("name");
        parser.end_element("config");
        parser.end_element("get_configs_response");
        assert!(!parser.importing());
        match parser.end_element("create_config") {
            EndResult::Complete(Command::CreateConfig(data)) => {
                let import = data.import.expect("import payload");
                assert_eq!(import.name.as_deref(), Some("Imported"));
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn import_collects_preferences_and_selectors() {
        let mut parser = CreateConfigParser::new();
        for step in [
            "get_configs_response",
            "config",
            "preferences",
            "preference",
        ] {
            parser.start_element(step, &Attrs::default());
        }
        parser.start_element("name", &Attrs::default());
        parser.text("timeout");
        parser.end_element("name");
        let nvt = Attrs::new(vec![("oid".into(), "1.3.6".into())]);
        parser.start_element("nvt", &nvt);
        parser.start_element("name", &Attrs::default());
        parser.text("Port scanner");
        parser.end_element("name");
        parser.end_element("nvt");
        parser.start_element("value", &Attrs::default());
        parser.text("30");
        parser.end_element("value");
        parser.end_element("preference");
        parser.end_element("preferences");

        parser.start_element("nvt_selectors", &Attrs::default());
        parser.start_element("nvt_selector", &Attrs::default());
        for (tag, value) in [
            ("name", "sel"),
            ("include", "1"),
            ("type", "2"),
            ("family_or_nvt", "Port scanners"),
        ] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        parser.end_element("nvt_selector");
        parser.end_element("nvt_selectors");
        parser.end_element("config");
        parser.end_element("get_configs_response");

        match parser.end_element("create_config") {
            EndResult::Complete(Command::CreateConfig(data)) => {
                let import = data.import.expect("import payload");
                assert_eq!(import.preferences.len(), 1);
                let preference = &import.preferences[0];
                assert_eq!(preference.name, "timeout");
                assert_eq!(preference.nvt_oid.as_deref(), Some("1.3.6"));
                assert_eq!(preference.nvt_name.as_deref(), Some("Port scanner"));
                assert_eq!(preference.value, "30");
                assert_eq!(import.nvt_selectors.len(), 1);
                let selector = &import.nvt_selectors[0];
                assert!(selector.include);
                assert_eq!(selector.selector_type, 2);
                assert_eq!(selector.family_or_nvt, "Port scanners");
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn modify_family_selection() {
        let attrs = Attrs::new(vec![("config_id".into(), "c1".into())]);
        let mut parser = ModifyConfigParser::new(&attrs);
        parser.start_element("family_selection", &Attrs::default());
        parser.start_element("growing", &Attrs::default());
        parser.text("1");
        parser.end_element("growing");
        parser.start_element("family", &Attrs::default());
        parser.start_element("name", &Attrs::default());
        parser.text("Port scanners");
        parser.end_element("name");
        parser.start_element("all", &Attrs::default());
        parser.text("1");
        parser.end_element("all");
        parser.end_element("family");
        parser.end_element("family_selection");
        match parser.end_element("modify_config") {
            EndResult::Complete(Command::ModifyConfig(data)) => {
                assert_eq!(data.config_id.as_deref(), Some("c1"));
                let selection = data.family_selection.expect("family selection");
                assert!(selection.growing);
                assert_eq!(selection.families.len(), 1);
                assert!(selection.families[0].all);
            }
            _ => panic!("expected completion"),
        }
    }
}
