use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Parse error in '{context}' on line {line}: {message}")]
    Parse {
        context: String,
        line: usize,
        message: String,
    },

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Parameter '{name}' is not a valid {expected} (value: '{value}')")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("Parameter file '{file}' not found in search path {searched:?}")]
    GroupNotFound {
        file: String,
        searched: Vec<PathBuf>,
    },

    #[error("Parameter group '{0}' has no backing file")]
    NoBackingFile(String),

    #[error("The PFILES environment variable is not set")]
    PfilesNotSet,
}

/// Declared type of a parameter, from the second field of its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParType {
    Bool,
    Int,
    Real,
    String,
    /// `f`, `fr`, `fw` and friends; treated as a string naming a file.
    Filename,
}

impl ParType {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "b" => Some(ParType::Bool),
            "i" => Some(ParType::Int),
            "r" => Some(ParType::Real),
            "s" => Some(ParType::String),
            t if t.starts_with('f') => Some(ParType::Filename),
            _ => None,
        }
    }
}

/// A parameter value parsed according to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl std::fmt::Display for ParValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParValue::Bool(true) => f.write_str("yes"),
            ParValue::Bool(false) => f.write_str("no"),
            ParValue::Int(v) => write!(f, "{}", v),
            ParValue::Real(v) => write!(f, "{}", v),
            ParValue::Text(v) => f.write_str(v),
        }
    }
}

fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.trim_matches('"');
    trimmed.trim_matches('\'')
}

/// One `name,type,mode,value,min,max,prompt` line of a parameter file.
///
/// The value, min, and max fields are stored verbatim (quotes included) so a
/// group writes back byte-compatible lines; the typed accessors strip quotes
/// before converting.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    type_tag: String,
    ptype: ParType,
    mode: String,
    value: String,
    min: String,
    max: String,
    prompt: String,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ptype(&self) -> ParType {
        self.ptype
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Hidden parameters are taken from the file without prompting.
    pub fn is_hidden(&self) -> bool {
        self.mode.contains('h')
    }

    pub fn prompt(&self) -> &str {
        unquote(&self.prompt)
    }

    /// The raw stored value, quotes and all.
    pub fn raw_value(&self) -> &str {
        &self.value
    }

    pub fn as_str(&self) -> &str {
        unquote(&self.value)
    }

    pub fn as_real(&self) -> Result<f64, ParError> {
        self.as_str()
            .parse()
            .map_err(|_| self.type_mismatch("real number"))
    }

    pub fn as_int(&self) -> Result<i64, ParError> {
        self.as_str()
            .parse()
            .map_err(|_| self.type_mismatch("integer"))
    }

    pub fn as_bool(&self) -> Result<bool, ParError> {
        match self.as_str().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "1" => Ok(true),
            "no" | "n" | "false" | "0" => Ok(false),
            _ => Err(self.type_mismatch("boolean")),
        }
    }

    /// The value converted according to the declared parameter type.
    pub fn typed_value(&self) -> Result<ParValue, ParError> {
        match self.ptype {
            ParType::Bool => self.as_bool().map(ParValue::Bool),
            ParType::Int => self.as_int().map(ParValue::Int),
            ParType::Real => self.as_real().map(ParValue::Real),
            ParType::String | ParType::Filename => Ok(ParValue::Text(self.as_str().to_string())),
        }
    }

    pub fn set(&mut self, value: impl ToString) {
        self.value = value.to_string();
    }

    fn type_mismatch(&self, expected: &'static str) -> ParError {
        ParError::TypeMismatch {
            name: self.name.clone(),
            expected,
            value: self.as_str().to_string(),
        }
    }

    fn parse(tokens: &[&str]) -> Result<Self, String> {
        if tokens.len() < 7 {
            return Err(format!(
                "expected at least 7 comma-separated fields, found {}",
                tokens.len()
            ));
        }
        let type_tag = tokens[1].to_string();
        let ptype = ParType::parse(&type_tag)
            .ok_or_else(|| format!("unknown parameter type '{}'", type_tag))?;
        Ok(Self {
            name: tokens[0].to_string(),
            type_tag,
            ptype,
            mode: tokens[2].to_string(),
            value: tokens[3].to_string(),
            min: tokens[4].to_string(),
            max: tokens[5].to_string(),
            prompt: tokens[6..].join(", "),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum GroupLine {
    /// A comment or blank line, preserved verbatim.
    Raw(String),
    Param(usize),
}

/// A named, ordered parameter group backed by a `.par` file.
#[derive(Debug, Clone)]
pub struct ParGroup {
    name: String,
    path: Option<PathBuf>,
    entries: Vec<Parameter>,
    index: HashMap<String, usize>,
    layout: Vec<GroupLine>,
}

impl ParGroup {
    /// Loads a group from a `.par` file, naming it after the file stem.
    pub fn load(path: &Path) -> Result<Self, ParError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = std::fs::File::open(path).map_err(|e| ParError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut group = Self::read_from(&mut BufReader::new(file), &name)?;
        group.path = Some(path.to_path_buf());
        Ok(group)
    }

    /// Parses a group from a reader; `name` is used in diagnostics only.
    pub fn read_from(reader: &mut impl BufRead, name: &str) -> Result<Self, ParError> {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        let mut layout = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res.map_err(|e| ParError::Io {
                path: name.to_string(),
                source: e,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                layout.push(GroupLine::Raw(line));
                continue;
            }

            let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
            let param = Parameter::parse(&tokens).map_err(|message| ParError::Parse {
                context: name.to_string(),
                line: line_num + 1,
                message,
            })?;
            if index.contains_key(param.name()) {
                return Err(ParError::Parse {
                    context: name.to_string(),
                    line: line_num + 1,
                    message: format!("duplicate parameter '{}'", param.name()),
                });
            }
            index.insert(param.name().to_string(), entries.len());
            layout.push(GroupLine::Param(entries.len()));
            entries.push(param);
        }

        Ok(Self {
            name: name.to_string(),
            path: None,
            entries,
            index,
            layout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameter names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.name())
    }

    pub fn get(&self, name: &str) -> Result<&Parameter, ParError> {
        self.index
            .get(name)
            .map(|i| &self.entries[*i])
            .ok_or_else(|| ParError::UnknownParameter(name.to_string()))
    }

    /// Updates a parameter's value; an unknown name is an error rather than an
    /// implicit insertion.
    pub fn set(&mut self, name: &str, value: impl ToString) -> Result<(), ParError> {
        let i = *self
            .index
            .get(name)
            .ok_or_else(|| ParError::UnknownParameter(name.to_string()))?;
        self.entries[i].set(value);
        Ok(())
    }

    /// Renders ` name=value` pairs for every parameter whose value converts
    /// cleanly, for handing the group to a command-line tool.
    pub fn command_line(&self) -> String {
        let mut args = String::new();
        for param in &self.entries {
            if let Ok(value) = param.typed_value() {
                let _ = write!(args, " {}={}", param.name(), value);
            }
        }
        args
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), io::Error> {
        for line in &self.layout {
            match line {
                GroupLine::Raw(raw) => writeln!(writer, "{}", raw)?,
                GroupLine::Param(i) => {
                    let p = &self.entries[*i];
                    writeln!(
                        writer,
                        "{},{},{},{},{},{},{}",
                        p.name, p.type_tag, p.mode, p.value, p.min, p.max, p.prompt
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Writes the group back to the file it was loaded from.
    pub fn save(&self) -> Result<(), ParError> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| ParError::NoBackingFile(self.name.clone()))?;
        self.save_as(&path)
    }

    pub fn save_as(&self, path: &Path) -> Result<(), ParError> {
        let mut file = std::fs::File::create(path).map_err(|e| ParError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        self.write_to(&mut file).map_err(|e| ParError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    const LIKE_PAR: &str = "\
#
# Parameters for the likelihood tool.
#
irfs,s,a,\"P8R3_SOURCE_V3\",,,\"Response functions to use\"
expcube,f,a,\"none\",,,\"Exposure hypercube file\"
optimizer,s,h,MINUIT,DRMNGB|NEWMINUIT|MINUIT,,Optimizer
chatter,i,h,2,0,4,Output verbosity
ftol,r,h,1e-3,,,\"Fit tolerance\"
clobber,b,h,yes,,,Overwrite existing output files
";

    fn like_group() -> ParGroup {
        ParGroup::read_from(&mut Cursor::new(LIKE_PAR), "like").unwrap()
    }

    #[test]
    fn parse_keeps_parameters_in_file_order() {
        let group = like_group();
        let names: Vec<&str> = group.names().collect();
        assert_eq!(
            names,
            vec!["irfs", "expcube", "optimizer", "chatter", "ftol", "clobber"]
        );
        assert_eq!(group.len(), 6);
    }

    #[test]
    fn string_values_are_unquoted_by_the_accessor() {
        let group = like_group();
        let irfs = group.get("irfs").unwrap();
        assert_eq!(irfs.raw_value(), "\"P8R3_SOURCE_V3\"");
        assert_eq!(irfs.as_str(), "P8R3_SOURCE_V3");
        assert_eq!(irfs.ptype(), ParType::String);
    }

    #[test]
    fn typed_accessors_convert_declared_types() {
        let group = like_group();
        assert_eq!(group.get("chatter").unwrap().as_int().unwrap(), 2);
        assert_eq!(group.get("ftol").unwrap().as_real().unwrap(), 1e-3);
        assert!(group.get("clobber").unwrap().as_bool().unwrap());
        assert_eq!(
            group.get("optimizer").unwrap().typed_value().unwrap(),
            ParValue::Text("MINUIT".to_string())
        );
    }

    #[test]
    fn typed_accessors_fail_on_unconvertible_values() {
        let group = like_group();
        let optimizer = group.get("optimizer").unwrap();
        assert!(matches!(
            optimizer.as_real(),
            Err(ParError::TypeMismatch { .. })
        ));
        assert!(matches!(
            optimizer.as_bool(),
            Err(ParError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn hidden_mode_is_detected() {
        let group = like_group();
        assert!(group.get("optimizer").unwrap().is_hidden());
        assert!(!group.get("irfs").unwrap().is_hidden());
    }

    #[test]
    fn prompt_text_after_extra_commas_folds_back_together() {
        let text = "title,s,h,value,,,first, second, third\n";
        let group = ParGroup::read_from(&mut Cursor::new(text), "t").unwrap();
        assert_eq!(
            group.get("title").unwrap().prompt(),
            "first, second, third"
        );
    }

    #[test]
    fn get_and_set_fail_for_unknown_names() {
        let mut group = like_group();
        assert!(matches!(
            group.get("nope"),
            Err(ParError::UnknownParameter(_))
        ));
        assert!(matches!(
            group.set("nope", 1),
            Err(ParError::UnknownParameter(_))
        ));
    }

    #[test]
    fn set_updates_the_stored_value() {
        let mut group = like_group();
        group.set("chatter", 4).unwrap();
        assert_eq!(group.get("chatter").unwrap().as_int().unwrap(), 4);
    }

    #[test]
    fn parse_rejects_short_lines() {
        let text = "broken,s,h\n";
        assert!(matches!(
            ParGroup::read_from(&mut Cursor::new(text), "t"),
            Err(ParError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn parse_rejects_unknown_type_tags() {
        let text = "weird,z,h,1,,,prompt\n";
        assert!(matches!(
            ParGroup::read_from(&mut Cursor::new(text), "t"),
            Err(ParError::Parse { .. })
        ));
    }

    #[test]
    fn parse_rejects_duplicate_parameters() {
        let text = "x,i,h,1,,,first\nx,i,h,2,,,second\n";
        assert!(matches!(
            ParGroup::read_from(&mut Cursor::new(text), "t"),
            Err(ParError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn write_round_trips_comments_and_values() {
        let mut group = like_group();
        group.set("chatter", 3).unwrap();

        let mut out = Vec::new();
        group.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("#\n# Parameters for the likelihood tool.\n#\n"));
        assert!(text.contains("chatter,i,h,3,0,4,Output verbosity"));
        assert!(text.contains("irfs,s,a,\"P8R3_SOURCE_V3\",,,\"Response functions to use\""));

        let reparsed = ParGroup::read_from(&mut Cursor::new(&text), "like").unwrap();
        assert_eq!(reparsed.get("chatter").unwrap().as_int().unwrap(), 3);
        let names: Vec<&str> = reparsed.names().collect();
        let original: Vec<&str> = group.names().collect();
        assert_eq!(names, original);
    }

    #[test]
    fn command_line_renders_name_value_pairs() {
        let group = like_group();
        let args = group.command_line();
        assert!(args.contains(" irfs=P8R3_SOURCE_V3"));
        assert!(args.contains(" chatter=2"));
        assert!(args.contains(" ftol=0.001"));
        assert!(args.contains(" clobber=yes"));
    }

    #[test]
    fn load_and_save_use_the_backing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("like.par");
        std::fs::write(&path, LIKE_PAR).unwrap();

        let mut group = ParGroup::load(&path).unwrap();
        assert_eq!(group.name(), "like");
        group.set("ftol", 1e-5).unwrap();
        group.save().unwrap();

        let reloaded = ParGroup::load(&path).unwrap();
        assert_eq!(reloaded.get("ftol").unwrap().as_real().unwrap(), 1e-5);
    }

    #[test]
    fn save_without_backing_file_is_an_error() {
        let group = like_group();
        assert!(matches!(group.save(), Err(ParError::NoBackingFile(_))));
    }
}
