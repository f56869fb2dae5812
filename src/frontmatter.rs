//! Splits source files into YAML front matter and body, and defines the
//! lenient accessors used to read loosely-typed front matter values. Front
//! matter is written by hand, so a post may carry `categories` as a list, a
//! bare string, `null`, or not at all; the accessors here return an empty
//! result for every shape they don't understand instead of failing.

use serde_yaml::{Mapping, Value};
use std::fmt;

const FENCE: &str = "---";

/// YAML's document-end marker, which Jekyll also accepts as a closing fence.
const DOCUMENT_END: &str = "...";

/// Returns `true` if `input` opens with a front matter fence. Files without
/// one are not documents (they're copied verbatim by site generators).
pub fn has_front_matter(input: &str) -> bool {
    input
        .split_inclusive('\n')
        .next()
        .map_or(false, |line| line.trim_end() == FENCE)
}

/// Splits `input` into its raw YAML front matter and its body. The opening
/// fence must be the first line; the front matter ends at the next line that
/// is exactly `---` (or `...`), ignoring trailing whitespace.
pub fn split(input: &str) -> Result<(&str, &str)> {
    let mut lines = input.split_inclusive('\n');
    match lines.next() {
        Some(line) if line.trim_end() == FENCE => {
            let yaml_start = line.len();
            let mut offset = yaml_start;
            for line in lines {
                let trimmed = line.trim_end();
                if trimmed == FENCE || trimmed == DOCUMENT_END {
                    return Ok((
                        &input[yaml_start..offset],
                        &input[offset + line.len()..],
                    ));
                }
                offset += line.len();
            }
            Err(Error::MissingEndFence)
        }
        _ => Err(Error::MissingStartFence),
    }
}

/// Parses the front matter of `input` into a [`Mapping`] and returns it along
/// with the body. An empty front matter block, or one that holds a YAML
/// scalar or list instead of a mapping, yields an empty mapping.
pub fn parse(input: &str) -> Result<(Mapping, &str)> {
    let (yaml, body) = split(input)?;
    if yaml.trim().is_empty() {
        return Ok((Mapping::new(), body));
    }
    let data = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => mapping,
        _ => Mapping::new(),
    };
    Ok((data, body))
}

/// Looks up a string key in a front matter mapping.
pub fn get<'a>(data: &'a Mapping, key: &str) -> Option<&'a Value> {
    data.get(&Value::String(key.to_owned()))
}

/// Returns `true` if the key is present but holds `false` or `null`. This is
/// how Jekyll reads switches such as `published`: leaving the key out keeps
/// the default, any other value counts as set.
pub fn is_falsy(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Null) | Some(Value::Bool(false)))
}

/// Reads `value` as a sequence of identifiers.
///
/// * Anything other than a sequence (absent, `null`, a string, a mapping)
///   yields an empty list.
/// * `null` and `false` entries are skipped.
/// * Strings are taken verbatim; other scalars are printed the way YAML
///   writes them (`2021`, `1.5`, `true`).
/// * Nested sequences and mappings are skipped.
pub fn string_seq(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => {
            items.iter().filter_map(scalar_to_string).collect()
        }
        _ => Vec::new(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some(String::from("true")),
        Value::Null
        | Value::Bool(false)
        | Value::Sequence(_)
        | Value::Mapping(_) => None,
    }
}

/// Represents the result of a front matter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading front matter.
#[derive(Debug)]
pub enum Error {
    /// Returned when the input doesn't begin with a `---` fence.
    MissingStartFence,

    /// Returned when the starting fence was found but the closing one was
    /// missing.
    MissingEndFence,

    /// Returned when the front matter isn't valid YAML.
    DeserializeYaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingStartFence => {
                write!(f, "front matter must begin with `---`")
            }
            Error::MissingEndFence => write!(f, "missing closing `---`"),
            Error::DeserializeYaml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingStartFence => None,
            Error::MissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seq(yaml: &str) -> Vec<String> {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        string_seq(Some(&value))
    }

    #[test]
    fn test_split() -> Result<()> {
        let (yaml, body) = split("---\ntitle: Hello\n---\n# Body\n")?;
        assert_eq!("title: Hello\n", yaml);
        assert_eq!("# Body\n", body);
        Ok(())
    }

    #[test]
    fn test_split_ignores_dashes_inside_values() -> Result<()> {
        let input = "---\ntitle: a---b\n---  \nbody";
        let (yaml, body) = split(input)?;
        assert_eq!("title: a---b\n", yaml);
        assert_eq!("body", body);
        Ok(())
    }

    #[test]
    fn test_split_document_end_marker() -> Result<()> {
        let (yaml, body) = split("---\nx: 1\n...\nrest")?;
        assert_eq!("x: 1\n", yaml);
        assert_eq!("rest", body);
        Ok(())
    }

    #[test]
    fn test_split_missing_fences() {
        assert!(matches!(split("title: x\n"), Err(Error::MissingStartFence)));
        assert!(matches!(split(""), Err(Error::MissingStartFence)));
        assert!(matches!(
            split("---\ntitle: x\n"),
            Err(Error::MissingEndFence)
        ));
    }

    #[test]
    fn test_has_front_matter() {
        assert!(has_front_matter("---\n---\n"));
        assert!(has_front_matter("---\r\nx: 1\r\n---\r\n"));
        assert!(!has_front_matter("plain text"));
        assert!(!has_front_matter("----\n"));
    }

    #[test]
    fn test_parse_empty_and_non_mapping() -> Result<()> {
        let (data, body) = parse("---\n---\nhi")?;
        assert!(data.is_empty());
        assert_eq!("hi", body);

        let (data, _) = parse("---\n- a\n- b\n---\n")?;
        assert!(data.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(matches!(
            parse("---\ntitle: [unclosed\n---\n"),
            Err(Error::DeserializeYaml(_))
        ));
    }

    #[test]
    fn test_get() -> Result<()> {
        let (data, _) = parse("---\ntitle: Hello\n---\n")?;
        assert_eq!(
            Some(&Value::String(String::from("Hello"))),
            get(&data, "title")
        );
        assert_eq!(None, get(&data, "categories"));
        Ok(())
    }

    #[test]
    fn test_is_falsy() -> Result<()> {
        let (data, _) = parse("---\na: false\nb: ~\nc: true\n---\n")?;
        assert!(is_falsy(get(&data, "a")));
        assert!(is_falsy(get(&data, "b")));
        assert!(!is_falsy(get(&data, "c")));
        assert!(!is_falsy(get(&data, "missing")));
        Ok(())
    }

    #[test]
    fn test_string_seq_non_sequences() {
        assert_eq!(Vec::<String>::new(), string_seq(None));
        assert_eq!(Vec::<String>::new(), seq("~"));
        assert_eq!(Vec::<String>::new(), seq("ruby"));
        assert_eq!(Vec::<String>::new(), seq("{a: b}"));
    }

    #[test]
    fn test_string_seq_entries() {
        assert_eq!(
            vec!["tutorials", "2021", "true"],
            seq("[~, tutorials, false, 2021, true, [x], {y: z}]")
        );
    }
}
