use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use serde::Deserialize;
use standard_merkle_tree::{AbiType, Hash, keccak256};

use crate::{Result, TypedDataError};

/// The type of one struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A static ABI type, encoded as its 32-byte word.
    Atomic(AbiType),
    /// UTF-8 string, encoded as the keccak of its bytes.
    String,
    /// Dynamic bytes, encoded as the keccak of its contents.
    Bytes,
    /// Reference to another struct, encoded as its struct hash.
    Struct(String),
    /// Dynamic (`T[]`) or fixed (`T[n]`) array.
    Array(Box<FieldType>, Option<usize>),
}

impl FieldType {
    /// Name of the struct this type refers to, looking through arrays.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            FieldType::Struct(name) => Some(name),
            FieldType::Array(inner, _) => inner.struct_name(),
            _ => None,
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl FromStr for FieldType {
    type Err = TypedDataError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if let Some(open) = name.strip_suffix(']').and_then(|n| n.rfind('[')) {
            let inner: FieldType = name[..open].parse()?;
            let size = &name[open + 1..name.len() - 1];
            let len = if size.is_empty() {
                None
            } else {
                Some(
                    size.parse()
                        .map_err(|_| TypedDataError::UnknownType(name.to_string()))?,
                )
            };
            return Ok(FieldType::Array(Box::new(inner), len));
        }
        match name {
            "string" => return Ok(FieldType::String),
            "bytes" => return Ok(FieldType::Bytes),
            _ => {}
        }
        if let Ok(atomic) = AbiType::parse(name) {
            return Ok(FieldType::Atomic(atomic));
        }
        let looks_atomic = ["uint", "int", "bytes"]
            .iter()
            .any(|p| name.strip_prefix(p).is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit())));
        if looks_atomic || !is_identifier(name) {
            return Err(TypedDataError::UnknownType(name.to_string()));
        }
        Ok(FieldType::Struct(name.to_string()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Atomic(ty) => write!(f, "{}", ty),
            FieldType::String => write!(f, "string"),
            FieldType::Bytes => write!(f, "bytes"),
            FieldType::Struct(name) => write!(f, "{}", name),
            FieldType::Array(inner, None) => write!(f, "{}[]", inner),
            FieldType::Array(inner, Some(len)) => write!(f, "{}[{}]", inner, len),
        }
    }
}

/// A named struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedField {
    /// Member name.
    pub name: String,
    /// Member type.
    pub ty: FieldType,
}

impl TypedField {
    /// Parse a member from its name and Solidity type spelling.
    pub fn new(name: &str, ty: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            ty: ty.parse()?,
        })
    }
}

#[derive(Deserialize)]
struct FieldSpec {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

/// A set of named struct schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedDataTypes {
    structs: BTreeMap<String, Vec<TypedField>>,
}

impl TypedDataTypes {
    /// Empty schema set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a struct from `(name, type)` pairs, replacing any previous
    /// definition with the same name.
    pub fn with_struct(mut self, name: &str, fields: &[(&str, &str)]) -> Result<Self> {
        let fields = fields
            .iter()
            .map(|(field, ty)| TypedField::new(field, ty))
            .collect::<Result<Vec<_>>>()?;
        self.structs.insert(name.to_string(), fields);
        Ok(self)
    }

    /// Schema set holding a single struct.
    pub fn from_fields(name: &str, fields: Vec<TypedField>) -> Self {
        let mut structs = BTreeMap::new();
        structs.insert(name.to_string(), fields);
        Self { structs }
    }

    /// Parse the JSON shape `{"Name": [{"name": "...", "type": "..."}]}`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let specs: BTreeMap<String, Vec<FieldSpec>> = serde_json::from_value(value.clone())
            .map_err(|e| TypedDataError::InvalidSchema(e.to_string()))?;
        let mut structs = BTreeMap::new();
        for (name, fields) in specs {
            let fields = fields
                .into_iter()
                .map(|f| TypedField::new(&f.name, &f.type_name))
                .collect::<Result<Vec<_>>>()?;
            structs.insert(name, fields);
        }
        Ok(Self { structs })
    }

    /// Fields of struct `name`.
    pub fn fields(&self, name: &str) -> Result<&[TypedField]> {
        self.structs
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| TypedDataError::UnknownType(name.to_string()))
    }

    /// Whether a struct named `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    /// Structs reachable from `primary`, excluding `primary` itself.
    fn dependencies(&self, primary: &str) -> Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();
        let mut pending = vec![primary.to_string()];
        while let Some(name) = pending.pop() {
            for field in self.fields(&name)? {
                if let Some(dep) = field.ty.struct_name() {
                    if dep != primary && found.insert(dep.to_string()) {
                        pending.push(dep.to_string());
                    }
                }
            }
        }
        Ok(found)
    }

    /// `Primary(type name,...)` followed by every referenced struct, sorted
    /// by name.
    pub fn encode_type(&self, primary: &str) -> Result<String> {
        let deps = self.dependencies(primary)?;
        let mut out = String::new();
        for name in std::iter::once(primary).chain(deps.iter().map(String::as_str)) {
            let members: Vec<String> = self
                .fields(name)?
                .iter()
                .map(|f| format!("{} {}", f.ty, f.name))
                .collect();
            out.push_str(&format!("{}({})", name, members.join(",")));
        }
        Ok(out)
    }

    /// `keccak256(encode_type(primary))`.
    pub fn type_hash(&self, primary: &str) -> Result<Hash> {
        Ok(keccak256(self.encode_type(primary)?))
    }
}
