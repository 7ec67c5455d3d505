//! CREATE_REPORT_FORMAT and MODIFY_REPORT_FORMAT.
//!
//! CREATE_REPORT_FORMAT only accepts the import form: a
//! GET_REPORT_FORMATS_RESPONSE payload carrying the format definition,
//! its files and parameters, plus a detached signature.

use omp_core::event::Attrs;

use crate::command::{
    Command, CreateReportFormat, ImportFormatFile, ImportFormatParam, ImportReportFormat,
    ModifyReportFormat,
};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateState {
    Root,
    /// Inside <get_report_formats_response>.
    Import,
    IFormat,
    IName,
    IExtension,
    IContentType,
    ISummary,
    IDescription,
    IGlobal,
    ISignature,
    IFile,
    IParam,
    IParamName,
    IParamValue,
}

impl CreateState {
    fn in_import(self) -> bool {
        !matches!(self, CreateState::Root)
    }
}

pub struct CreateReportFormatParser {
    state: CreateState,
    data: CreateReportFormat,
    global_buf: String,
}

impl CreateReportFormatParser {
    pub fn new() -> Self {
        CreateReportFormatParser {
            state: CreateState::Root,
            data: CreateReportFormat::default(),
            global_buf: String::new(),
        }
    }

    fn import_mut(&mut self) -> &mut ImportReportFormat {
        self.data
            .import
            .get_or_insert_with(ImportReportFormat::default)
    }
}

impl ElementParser for CreateReportFormatParser {
    fn start_element(&mut self, name: &str, attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (CreateState::Root, "get_report_formats_response") => {
                self.data.import = Some(ImportReportFormat::default());
                CreateState::Import
            }
            (CreateState::Import, "report_format") => CreateState::IFormat,
            (CreateState::IFormat, "name") => CreateState::IName,
            (CreateState::IFormat, "extension") => CreateState::IExtension,
            (CreateState::IFormat, "content_type") => CreateState::IContentType,
            (CreateState::IFormat, "summary") => CreateState::ISummary,
            (CreateState::IFormat, "description") => CreateState::IDescription,
            (CreateState::IFormat, "global") => {
                self.global_buf.clear();
                CreateState::IGlobal
            }
            (CreateState::IFormat, "signature") => CreateState::ISignature,
            (CreateState::IFormat, "file") => {
                let file_name = attrs.get_owned("name").unwrap_or_default();
                self.import_mut().files.push(ImportFormatFile {
                    name: file_name,
                    content: String::new(),
                });
                CreateState::IFile
            }
            (CreateState::IFormat, "param") => {
                self.import_mut().params.push(ImportFormatParam::default());
                CreateState::IParam
            }
            (CreateState::IParam, "name") => CreateState::IParamName,
            (CreateState::IParam, "value") => CreateState::IParamValue,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            CreateState::IName => append(&mut self.import_mut().name, text),
            CreateState::IExtension => append(&mut self.import_mut().extension, text),
            CreateState::IContentType => append(&mut self.import_mut().content_type, text),
            CreateState::ISummary => append(&mut self.import_mut().summary, text),
            CreateState::IDescription => append(&mut self.import_mut().description, text),
            CreateState::IGlobal => self.global_buf.push_str(text),
            CreateState::ISignature => append(&mut self.import_mut().signature, text),
            CreateState::IFile => {
                if let Some(file) = self.import_mut().files.last_mut() {
                    file.content.push_str(text);
                }
            }
            CreateState::IParamName => {
                if let Some(param) = self.import_mut().params.last_mut() {
                    param.name.push_str(text);
                }
            }
            CreateState::IParamValue => {
                if let Some(param) = self.import_mut().params.last_mut() {
                    param.value.push_str(text);
                }
            }
            CreateState::Root | CreateState::Import | CreateState::IFormat | CreateState::IParam => {
            }
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        self.state = match self.state {
            CreateState::Root => {
                return EndResult::Complete(Command::CreateReportFormat(std::mem::take(
                    &mut self.data,
                )))
            }
            CreateState::Import => CreateState::Root,
            CreateState::IFormat => CreateState::Import,
            CreateState::IGlobal => {
                let global = self.global_buf.trim() == "1";
                self.import_mut().global = global;
                CreateState::IFormat
            }
            CreateState::ISignature => CreateState::IFormat,
            CreateState::IParamName | CreateState::IParamValue => CreateState::IParam,
            CreateState::IParam => CreateState::IFormat,
            _ => CreateState::IFormat,
        };
        EndResult::Open
    }

    fn importing(&self) -> bool {
        self.state.in_import()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifyState {
    Root,
    Name,
    Summary,
    Active,
}

pub struct ModifyReportFormatParser {
    state: ModifyState,
    data: ModifyReportFormat,
}

impl ModifyReportFormatParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyReportFormatParser {
            state: ModifyState::Root,
            data: ModifyReportFormat {
                report_format_id: attrs.get_owned("report_format_id"),
                ..ModifyReportFormat::default()
            },
        }
    }
}

impl ElementParser for ModifyReportFormatParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        let next = match (self.state, name) {
            (ModifyState::Root, "name") => ModifyState::Name,
            (ModifyState::Root, "summary") => ModifyState::Summary,
            (ModifyState::Root, "active") => ModifyState::Active,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            ModifyState::Name => append(&mut self.data.name, text),
            ModifyState::Summary => append(&mut self.data.summary, text),
            ModifyState::Active => append(&mut self.data.active, text),
            ModifyState::Root => {}
        }
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        match self.state {
            ModifyState::Root => EndResult::Complete(Command::ModifyReportFormat(
                std::mem::take(&mut self.data),
            )),
            _ => {
                self.state = ModifyState::Root;
                EndResult::Open
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_collects_files_and_params() {
        let mut parser = CreateReportFormatParser::new();
        parser.start_element("get_report_formats_response", &Attrs::default());
        assert!(parser.importing());
        parser.start_element("report_format", &Attrs::default());
        parser.start_element("name", &Attrs::default());
        parser.text("LaTeX");
        parser.end_element("name");
        parser.start_element("global", &Attrs::default());
        parser.text("1");
        parser.end_element("global");
        let file_attrs = Attrs::new(vec![("name".into(), "report.tex".into())]);
        parser.start_element("file", &file_attrs);
        parser.text("XGRleA==");
        parser.end_element("file");
        parser.start_element("param", &Attrs::default());
        parser.start_element("name", &Attrs::default());
        parser.text("pagesize");
        parser.end_element("name");
        parser.start_element("value", &Attrs::default());
        parser.text("a4");
        parser.end_element("value");
        parser.end_element("param");
        parser.end_element("report_format");
        parser.end_element("get_report_formats_response");
        match parser.end_element("create_report_format") {
            EndResult::Complete(Command::CreateReportFormat(data)) => {
                let import = data.import.expect("import payload");
                assert_eq!(import.name.as_deref(), Some("LaTeX"));
                assert!(import.global);
                assert_eq!(import.files.len(), 1);
                assert_eq!(import.files[0].name, "report.tex");
                assert_eq!(import.params.len(), 1);
                assert_eq!(import.params[0].name, "pagesize");
                assert_eq!(import.params[0].value, "a4");
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn create_without_import_completes_empty() {
        let mut parser = CreateReportFormatParser::new();
        match parser.end_element("create_report_format") {
            EndResult::Complete(Command::CreateReportFormat(data)) => {
                assert!(data.import.is_none());
            }
            _ => panic!("expected completion"),
        }
    }
}
