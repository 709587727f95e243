//! Keyed-archive decoding
//!
//! The reader stores each title's metadata as an `NSKeyedArchiver` binary
//! property list: a flat `$objects` table whose entries point at each other
//! through UID values, rooted at `$top.root`. [`decode_keyed_archive`]
//! follows those references and returns an ordinary property-list tree in
//! which collection and string wrapper classes have been unwrapped.

use plist::{Dictionary, Value};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use thiserror::Error;

const COLLECTION_CLASSES: &[&str] = &[
    "NSArray",
    "NSMutableArray",
    "NSSet",
    "NSMutableSet",
    "NSOrderedSet",
    "NSMutableOrderedSet",
];
const DICTIONARY_CLASSES: &[&str] = &["NSDictionary", "NSMutableDictionary"];
const STRING_CLASSES: &[&str] = &["NSString", "NSMutableString"];

/// Errors raised while decoding a keyed archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not a property list: {0}")]
    Plist(#[from] plist::Error),

    #[error("archive has no {0}")]
    MissingEntry(&'static str),

    #[error("reference to object {0} is out of range")]
    DanglingReference(u64),

    #[error("object {0} refers back to itself")]
    CyclicReference(u64),
}

/// Decodes an `NSKeyedArchiver` property list into a plain value tree
pub fn decode_keyed_archive(bytes: &[u8]) -> Result<Value, ArchiveError> {
    let root = Value::from_reader(Cursor::new(bytes))?;
    let root = root
        .as_dictionary()
        .ok_or(ArchiveError::MissingEntry("root dictionary"))?;
    let objects = root
        .get("$objects")
        .and_then(Value::as_array)
        .ok_or(ArchiveError::MissingEntry("$objects table"))?;
    let top = root
        .get("$top")
        .and_then(Value::as_dictionary)
        .and_then(|top| top.get("root"))
        .ok_or(ArchiveError::MissingEntry("$top.root entry"))?;

    Resolver::new(objects).resolve(top)
}

struct Resolver<'a> {
    objects: &'a [Value],
    class_names: HashMap<u64, &'a str>,
    memo: HashMap<u64, Value>,
    in_progress: HashSet<u64>,
}

impl<'a> Resolver<'a> {
    fn new(objects: &'a [Value]) -> Self {
        let class_names = objects
            .iter()
            .enumerate()
            .filter_map(|(index, object)| {
                let name = object.as_dictionary()?.get("$classname")?.as_string()?;
                Some((index as u64, name))
            })
            .collect();

        Self {
            objects,
            class_names,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn resolve(&mut self, value: &Value) -> Result<Value, ArchiveError> {
        match value {
            Value::Uid(uid) => self.resolve_reference(uid.get()),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Dictionary(dict) => self.resolve_dictionary(dict),
            other => Ok(other.clone()),
        }
    }

    fn resolve_reference(&mut self, index: u64) -> Result<Value, ArchiveError> {
        if let Some(done) = self.memo.get(&index) {
            return Ok(done.clone());
        }
        if !self.in_progress.insert(index) {
            return Err(ArchiveError::CyclicReference(index));
        }

        let objects = self.objects;
        let raw = usize::try_from(index)
            .ok()
            .and_then(|i| objects.get(i))
            .ok_or(ArchiveError::DanglingReference(index))?;

        let resolved = self.resolve(raw);
        self.in_progress.remove(&index);
        let resolved = resolved?;

        self.memo.insert(index, resolved.clone());
        Ok(resolved)
    }

    fn resolve_dictionary(&mut self, dict: &Dictionary) -> Result<Value, ArchiveError> {
        let class_name = match dict.get("$class") {
            Some(Value::Uid(uid)) => self.class_names.get(&uid.get()).copied(),
            _ => None,
        };

        if let Some(name) = class_name {
            if COLLECTION_CLASSES.contains(&name) {
                if let Some(items) = dict.get("NS.objects") {
                    return self.resolve(items);
                }
            }
            if DICTIONARY_CLASSES.contains(&name) {
                if let (Some(keys), Some(values)) = (dict.get("NS.keys"), dict.get("NS.objects"))
                {
                    return self.resolve_pairs(keys, values);
                }
            }
            if STRING_CLASSES.contains(&name) {
                if let Some(text) = dict.get("NS.string") {
                    return self.resolve(text);
                }
            }
        }

        let mut out = Dictionary::new();
        for (key, value) in dict.iter() {
            if key.starts_with('$') {
                continue;
            }
            out.insert(key.clone(), self.resolve(value)?);
        }
        Ok(Value::Dictionary(out))
    }

    fn resolve_pairs(&mut self, keys: &Value, values: &Value) -> Result<Value, ArchiveError> {
        let mut out = Dictionary::new();
        if let (Value::Array(keys), Value::Array(values)) = (self.resolve(keys)?, self.resolve(values)?)
        {
            for (key, value) in keys.into_iter().zip(values) {
                out.insert(key_text(&key), value);
            }
        }
        Ok(Value::Dictionary(out))
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        Value::Integer(n) => n
            .as_signed()
            .map(|v| v.to_string())
            .or_else(|| n.as_unsigned().map(|v| v.to_string()))
            .unwrap_or_default(),
        other => format!("{:?}", other),
    }
}
