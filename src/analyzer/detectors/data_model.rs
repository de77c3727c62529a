//! Data Model Detector
//!
//! Four extractors run over every data-model file, in order:
//!
//! 1. TypeScript `interface X { ... }` blocks
//! 2. Object type aliases, `type X = { ... }`
//! 3. Schema builders (Mongoose `new Schema({ ... })`, Zod `z.object({ ... })`)
//! 4. Prisma `model X { ... }` blocks
//!
//! Everything is merged into one [`DataModel`] by key-wise overwrite: when two
//! extractors (or files) produce the same field of the same entity, the later
//! one wins. Fields are never merged attribute by attribute.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::{Detector, SourceReader, brace_block, split_top_level};
use crate::types::{
    Cardinality, DataField, DataModel, DataModelEntity, RepositoryIndex, Relationship,
    capitalize_first,
};

// ---------------------------------------------------------------------------
// Regex patterns (compiled once via LazyLock)
// ---------------------------------------------------------------------------

static INTERFACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?interface\s+([A-Z]\w*)(?:\s*<[^>{]*>)?(?:\s+extends\s+[^{]+)?\s*\{",
    )
    .expect("valid regex literal")
});

static TYPE_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?type\s+([A-Z]\w*)(?:\s*<[^>=]*>)?\s*=\s*\{")
        .expect("valid regex literal")
});

static TS_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^(?:readonly\s+)?["']?([A-Za-z_$][\w$]*)["']?\s*(\?)?\s*:\s*(.+)$"#)
        .expect("valid regex literal")
});

static MONGOOSE_SCHEMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let|var)\s+(\w+)\s*=\s*new\s+(?:mongoose\.)?Schema\s*\(\s*\{")
        .expect("valid regex literal")
});

static MONGOOSE_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"model\s*(?:<[^>]*>)?\(\s*["'](\w+)["']\s*,\s*(\w+)"#).expect("valid regex literal")
});

static ZOD_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let|var)\s+(\w+)\s*=\s*z\.object\(\s*\{").expect("valid regex literal")
});

static ZOD_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^z\.(\w+)").expect("valid regex literal"));

static PRISMA_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*model\s+(\w+)\s*\{").expect("valid regex literal")
});

static PRISMA_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)\s+(\w+)(\[\])?(\?)?(.*)$").expect("valid regex literal")
});

static OPTION_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\btype\s*:\s*\[?\s*([\w.]+)").expect("valid regex literal")
});

static OPTION_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bref\s*:\s*["'](\w+)["']"#).expect("valid regex literal")
});

static OPTION_REQUIRED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\brequired\s*:\s*\[?\s*true").expect("valid regex literal")
});

static OPTION_UNIQUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bunique\s*:\s*true").expect("valid regex literal"));

/// One entity as seen by a single extractor
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntity {
    pub name: String,
    pub entity: DataModelEntity,
}

type Extractor = fn(&str) -> Vec<ExtractedEntity>;

/// Extractors in merge order (later overwrites earlier)
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("interface", extract_interfaces),
    ("type-alias", extract_type_aliases),
    ("schema-builder", extract_schema_builders),
    ("prisma", extract_prisma_models),
];

// =============================================================================
// TypeScript
// =============================================================================

pub fn extract_interfaces(content: &str) -> Vec<ExtractedEntity> {
    extract_ts_blocks(&INTERFACE_RE, content)
}

pub fn extract_type_aliases(content: &str) -> Vec<ExtractedEntity> {
    extract_ts_blocks(&TYPE_ALIAS_RE, content)
}

fn extract_ts_blocks(re: &Regex, content: &str) -> Vec<ExtractedEntity> {
    let mut out = Vec::new();

    for cap in re.captures_iter(content) {
        let name = &cap[1];
        if name.ends_with("Props") {
            continue;
        }
        let open = cap.get(0).map_or(0, |m| m.end() - 1);
        let Some(body) = brace_block(content, open) else {
            continue;
        };

        let mut entity = DataModelEntity::default();
        for entry in split_top_level(body) {
            if let Some((field, data)) = parse_ts_field(&entry) {
                entity.fields.insert(field, data);
            }
        }
        out.push(ExtractedEntity {
            name: name.to_string(),
            entity,
        });
    }

    out
}

/// `name?: Type` → field. Methods, index signatures and comments yield `None`.
fn parse_ts_field(entry: &str) -> Option<(String, DataField)> {
    let cap = TS_FIELD_RE.captures(entry)?;
    let raw_type = cap[3].trim().trim_end_matches([';', ',']).trim();

    let mut optional = cap.get(2).is_some();
    let mut parts: Vec<&str> = Vec::new();
    for part in raw_type.split('|').map(str::trim) {
        if part == "undefined" || part == "null" {
            optional = true;
        } else if !part.is_empty() {
            parts.push(part);
        }
    }
    if parts.is_empty() {
        return None;
    }

    let joined = parts.join(" | ");
    let field_type = if joined.starts_with('{') {
        "object".to_string()
    } else {
        joined.split_whitespace().collect::<Vec<_>>().join(" ")
    };

    Some((cap[1].to_string(), DataField::new(field_type, !optional)))
}

// =============================================================================
// Schema Builders
// =============================================================================

pub fn extract_schema_builders(content: &str) -> Vec<ExtractedEntity> {
    let mut out = Vec::new();

    if content.contains("Schema(") {
        let model_names: Vec<(String, String)> = MONGOOSE_MODEL_RE
            .captures_iter(content)
            .map(|c| (c[2].to_string(), c[1].to_string()))
            .collect();

        for cap in MONGOOSE_SCHEMA_RE.captures_iter(content) {
            let var = &cap[1];
            let name = model_names
                .iter()
                .find(|(v, _)| v == var)
                .map(|(_, n)| n.clone())
                .unwrap_or_else(|| entity_name_from_var(var));
            let open = cap.get(0).map_or(0, |m| m.end() - 1);
            if let Some(body) = brace_block(content, open) {
                out.push(ExtractedEntity {
                    name,
                    entity: parse_mongoose_fields(body),
                });
            }
        }
    }

    if content.contains("z.object") {
        for cap in ZOD_OBJECT_RE.captures_iter(content) {
            let open = cap.get(0).map_or(0, |m| m.end() - 1);
            if let Some(body) = brace_block(content, open) {
                out.push(ExtractedEntity {
                    name: entity_name_from_var(&cap[1]),
                    entity: parse_zod_fields(body),
                });
            }
        }
    }

    out
}

/// `userSchema` → `User`, `OrderValidator` → `Order`
fn entity_name_from_var(var: &str) -> String {
    let base = ["Schema", "schema", "Validator", "Model"]
        .iter()
        .find_map(|suffix| var.strip_suffix(suffix).filter(|s| !s.is_empty()))
        .unwrap_or(var);
    capitalize_first(base)
}

fn short_type(raw: &str) -> String {
    raw.rsplit('.').next().unwrap_or(raw).to_string()
}

fn parse_mongoose_fields(body: &str) -> DataModelEntity {
    let mut entity = DataModelEntity::default();

    for entry in split_top_level(body) {
        let Some((key, value)) = entry.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches(|c| c == '"' || c == '\'');
        if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
            continue;
        }
        let value = value.trim();

        let is_list = value.starts_with('[');
        let inner = if is_list {
            value.trim_start_matches('[').trim_end_matches(']').trim()
        } else {
            value
        };

        let (base_type, required, unique, reference) = if inner.starts_with('{') {
            let base = OPTION_TYPE_RE
                .captures(inner)
                .map(|c| short_type(&c[1]))
                .unwrap_or_else(|| "Object".to_string());
            (
                base,
                OPTION_REQUIRED_RE.is_match(inner),
                OPTION_UNIQUE_RE.is_match(inner),
                OPTION_REF_RE.captures(inner).map(|c| c[1].to_string()),
            )
        } else if !inner.is_empty() && inner.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '_') {
            (short_type(inner), false, false, None)
        } else {
            continue;
        };

        let field_type = if is_list { format!("{}[]", base_type) } else { base_type };
        let mut field = DataField::new(field_type, required);
        if unique {
            field = field.with_unique(true);
        }
        entity.fields.insert(key.to_string(), field);

        if let Some(target) = reference {
            entity.relationships.push(Relationship {
                field: key.to_string(),
                target,
                cardinality: if is_list { Cardinality::Many } else { Cardinality::One },
            });
        }
    }

    entity
}

fn parse_zod_fields(body: &str) -> DataModelEntity {
    let mut entity = DataModelEntity::default();

    for entry in split_top_level(body) {
        let Some((key, value)) = entry.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
            continue;
        }
        let value = value.trim();

        let field_type = match ZOD_TYPE_RE.captures(value) {
            Some(c) => c[1].to_string(),
            // reference to another schema
            None => match value.split('.').next() {
                Some(ident) if !ident.is_empty() && ident.chars().all(|c| c.is_alphanumeric() || c == '_') => {
                    entity_name_from_var(ident)
                }
                _ => continue,
            },
        };
        let optional = value.contains(".optional()") || value.contains(".nullish()");
        entity.fields.insert(key.to_string(), DataField::new(field_type, !optional));
    }

    entity
}

// =============================================================================
// Prisma
// =============================================================================

pub fn extract_prisma_models(content: &str) -> Vec<ExtractedEntity> {
    let blocks: Vec<(String, &str)> = PRISMA_MODEL_RE
        .captures_iter(content)
        .filter_map(|cap| {
            let open = cap.get(0).map_or(0, |m| m.end() - 1);
            brace_block(content, open).map(|body| (cap[1].to_string(), body))
        })
        .collect();
    let model_names: HashSet<&str> = blocks.iter().map(|(name, _)| name.as_str()).collect();

    blocks
        .iter()
        .map(|(name, body)| {
            let mut entity = DataModelEntity::default();

            for line in body.lines().map(str::trim) {
                if line.is_empty() || line.starts_with("//") || line.starts_with("@@") {
                    continue;
                }
                let Some(cap) = PRISMA_FIELD_RE.captures(line) else {
                    continue;
                };
                let field = &cap[1];
                let base_type = &cap[2];
                let is_list = cap.get(3).is_some();
                let attrs = &cap[5];

                let field_type = if is_list { format!("{}[]", base_type) } else { base_type.to_string() };
                let mut data = DataField::new(field_type, cap.get(4).is_none() && !is_list);
                if attrs.contains("@unique") || attrs.contains("@id") {
                    data = data.with_unique(true);
                }
                entity.fields.insert(field.to_string(), data);

                if model_names.contains(base_type) || attrs.contains("@relation") {
                    entity.relationships.push(Relationship {
                        field: field.to_string(),
                        target: base_type.to_string(),
                        cardinality: if is_list { Cardinality::Many } else { Cardinality::One },
                    });
                }
            }

            ExtractedEntity {
                name: name.clone(),
                entity,
            }
        })
        .collect()
}

// =============================================================================
// Detector
// =============================================================================

pub struct DataModelDetector;

impl Default for DataModelDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DataModelDetector {
    pub fn new() -> Self {
        Self
    }

    /// Run every extractor over one file, in merge order
    pub fn extract(content: &str) -> Vec<ExtractedEntity> {
        EXTRACTORS
            .iter()
            .flat_map(|(_, extractor)| extractor(content))
            .collect()
    }

    /// Key-wise overwrite: a later field replaces an earlier one of the same name
    pub fn merge(model: &mut DataModel, extracted: ExtractedEntity) {
        let target = model.entry(extracted.name).or_default();
        target.fields.extend(extracted.entity.fields);
        for rel in extracted.entity.relationships {
            target.relationships.retain(|r| r.field != rel.field);
            target.relationships.push(rel);
        }
    }
}

impl Detector for DataModelDetector {
    type Finding = (String, DataModelEntity);

    fn name(&self) -> &'static str {
        "data-model"
    }

    fn detect(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<(String, DataModelEntity)> {
        let mut model = DataModel::new();

        for path in &index.data_model_files {
            let Some(content) = source.read(path) else {
                continue;
            };
            for extracted in Self::extract(&content) {
                Self::merge(&mut model, extracted);
            }
        }

        model.retain(|_, entity| !entity.fields.is_empty());
        debug!("Data model detector: {} entities", model.len());
        model.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::scanner::classify_paths;
    use std::fs;
    use tempfile::TempDir;

    fn field(entity: &DataModelEntity, name: &str) -> DataField {
        entity.fields.get(name).cloned().unwrap()
    }

    #[test]
    fn test_interface_fields() {
        let content = r#"
export interface User extends Base {
  id: string;
  email?: string;
  nickname: string | null;
  tags: string[];
  address: { street: string; city: string };
  onSave: () => void;
  greet(): string;
}

interface ButtonProps { label: string }
"#;
        let entities = extract_interfaces(content);
        assert_eq!(entities.len(), 1);
        let user = &entities[0];
        assert_eq!(user.name, "User");
        assert_eq!(field(&user.entity, "id"), DataField::new("string", true));
        assert_eq!(field(&user.entity, "email"), DataField::new("string", false));
        assert_eq!(field(&user.entity, "nickname"), DataField::new("string", false));
        assert_eq!(field(&user.entity, "tags").field_type, "string[]");
        assert_eq!(field(&user.entity, "address").field_type, "object");
        assert_eq!(field(&user.entity, "onSave").field_type, "() => void");
        assert!(!user.entity.fields.contains_key("greet"));
    }

    #[test]
    fn test_interface_with_comparison_in_comment() {
        let content = "export interface User {\n  // age must be < 150\n  id: string;\n  age: number;\n  /** keyed by id > 0 */\n  items: Map<string, Item>;\n}";
        let entities = extract_interfaces(content);
        assert_eq!(entities.len(), 1);
        let user = &entities[0].entity;
        assert_eq!(user.fields.len(), 3);
        assert_eq!(field(user, "id"), DataField::new("string", true));
        assert_eq!(field(user, "age"), DataField::new("number", true));
        assert_eq!(field(user, "items"), DataField::new("Map<string, Item>", true));
    }

    #[test]
    fn test_type_alias() {
        let entities = extract_type_aliases("export type Order = { id: number; total?: number };\ntype Id = string;");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Order");
        assert_eq!(entities[0].entity.fields.len(), 2);
        assert!(!field(&entities[0].entity, "total").required);
    }

    #[test]
    fn test_mongoose_schema() {
        let content = r#"
const userSchema = new mongoose.Schema({
  email: { type: String, required: true, unique: true },
  name: String,
  posts: [{ type: Schema.Types.ObjectId, ref: 'Post' }],
  org: { type: mongoose.Schema.Types.ObjectId, ref: "Org" },
});
module.exports = mongoose.model("Account", userSchema);
"#;
        let entities = extract_schema_builders(content);
        assert_eq!(entities.len(), 1);
        let account = &entities[0];
        assert_eq!(account.name, "Account");
        assert_eq!(field(&account.entity, "email"), DataField::new("String", true).with_unique(true));
        assert_eq!(field(&account.entity, "name"), DataField::new("String", false));
        assert_eq!(field(&account.entity, "posts").field_type, "ObjectId[]");
        assert_eq!(
            account.entity.relationships,
            vec![
                Relationship {
                    field: "posts".into(),
                    target: "Post".into(),
                    cardinality: Cardinality::Many
                },
                Relationship {
                    field: "org".into(),
                    target: "Org".into(),
                    cardinality: Cardinality::One
                },
            ]
        );
    }

    #[test]
    fn test_zod_object() {
        let content = r#"
export const productSchema = z.object({
  title: z.string().min(1),
  price: z.number().positive(),
  notes: z.string().optional(),
  category: categorySchema,
});
"#;
        let entities = extract_schema_builders(content);
        assert_eq!(entities[0].name, "Product");
        let e = &entities[0].entity;
        assert_eq!(field(e, "title"), DataField::new("string", true));
        assert_eq!(field(e, "price").field_type, "number");
        assert!(!field(e, "notes").required);
        assert_eq!(field(e, "category").field_type, "Category");
    }

    #[test]
    fn test_prisma_models() {
        let content = r#"
model User {
  id    Int     @id @default(autoincrement())
  email String  @unique
  name  String?
  posts Post[]
  @@map("users")
}

model Post {
  id       Int  @id
  author   User @relation(fields: [authorId], references: [id])
  authorId Int
}
"#;
        let entities = extract_prisma_models(content);
        assert_eq!(entities.len(), 2);
        let user = &entities[0].entity;
        assert_eq!(field(user, "id"), DataField::new("Int", true).with_unique(true));
        assert_eq!(field(user, "email").unique, Some(true));
        assert!(!field(user, "name").required);
        assert_eq!(field(user, "posts").field_type, "Post[]");
        assert_eq!(user.relationships.len(), 1);
        assert_eq!(user.relationships[0].cardinality, Cardinality::Many);

        let post = &entities[1].entity;
        assert_eq!(post.relationships[0].target, "User");
        assert_eq!(post.relationships[0].cardinality, Cardinality::One);
        assert_eq!(post.fields.len(), 3);
    }

    #[test]
    fn test_later_extractor_overwrites_field() {
        // Current behavior: the schema builder runs after the interface
        // extractor, so its view of `email` replaces the interface's wholesale.
        let content = r#"
interface User { email: string; age: number }
const userSchema = z.object({ email: z.string().optional() });
"#;
        let mut model = DataModel::new();
        for e in DataModelDetector::extract(content) {
            DataModelDetector::merge(&mut model, e);
        }
        let user = &model["User"];
        assert_eq!(field(user, "email"), DataField::new("string", false));
        assert_eq!(field(user, "age"), DataField::new("number", true));
    }

    #[test]
    fn test_detect_skips_empty_and_unreadable() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/types")).unwrap();
        fs::write(temp.path().join("src/types/user.ts"), "export interface User { id: string }\ninterface Empty {}").unwrap();
        fs::write(temp.path().join("src/types/bad.ts"), [0xc3, 0x28]).unwrap();

        let index = classify_paths(vec!["src/types/bad.ts".to_string(), "src/types/user.ts".to_string()]);
        let found = DataModelDetector::new().detect(&SourceReader::new(temp.path()), &index);
        let names: Vec<&str> = found.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["User"]);
    }
}
