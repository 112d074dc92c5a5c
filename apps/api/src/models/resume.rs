//! Résumé data model as submitted by the form.
//!
//! Every scalar is optional: partial data must still flow through the preview
//! path. Entry keys accept both the camelCase English names and the Spanish
//! names the form emits (`cargo`, `empresa`, `fechaInicio`, ...).

use serde::{de, Deserialize, Deserializer, Serialize};

/// Returns true when the field holds something other than whitespace.
pub fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Trimmed view of an optional field, `None` when blank.
pub fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgeInput {
    Number(i64),
    Text(String),
}

/// Accepts `29`, `"29"`, `""` and `null`. Form inputs post numbers as strings.
fn lenient_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<AgeInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(AgeInput::Number(age)) => Ok(Some(age)),
        Some(AgeInput::Text(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("age must be a whole number, got {raw:?}")))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    // ── Identity ────────────────────────────────────────────────────────────
    #[serde(alias = "nombre")]
    pub name: Option<String>,
    #[serde(alias = "apellido")]
    pub surname: Option<String>,
    /// Range is checked by the validator, not here.
    #[serde(alias = "edad", deserialize_with = "lenient_age")]
    pub age: Option<i64>,
    /// Professional title, e.g. "Desarrolladora Backend".
    #[serde(alias = "titulo")]
    pub title: Option<String>,
    #[serde(alias = "carrera")]
    pub field_of_study: Option<String>,

    // ── Contact ─────────────────────────────────────────────────────────────
    #[serde(alias = "telefono")]
    pub phone: Option<String>,
    #[serde(alias = "direccion")]
    pub address: Option<String>,
    /// Professional-network profile URL.
    pub linkedin: Option<String>,
    #[serde(alias = "sitioWeb")]
    pub website: Option<String>,
    /// Free-text professional summary; length is bounded by the validator.
    #[serde(alias = "perfil")]
    pub summary: Option<String>,

    // ── Collections (order = display order) ─────────────────────────────────
    #[serde(alias = "experiencias")]
    pub experiences: Vec<Experience>,
    #[serde(alias = "educacion")]
    pub education: Vec<Education>,
    #[serde(alias = "habilidades")]
    pub skills: Vec<Skill>,
    #[serde(alias = "idiomas")]
    pub languages: Vec<Language>,
    #[serde(alias = "certificaciones")]
    pub certifications: Vec<Certification>,
    #[serde(alias = "proyectos")]
    pub projects: Vec<Project>,
    #[serde(alias = "referencias")]
    pub references: Vec<Reference>,
}

impl ResumeData {
    /// "Name Surname", skipping whichever part is missing.
    pub fn full_name(&self) -> String {
        [text(&self.name), text(&self.surname)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Up to two uppercase initials, used by the sidebar glyph.
    pub fn initials(&self) -> String {
        [text(&self.name), text(&self.surname)]
            .into_iter()
            .flatten()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Contact fields that are present, in display order.
    pub fn contact_fields(&self) -> Vec<&str> {
        [
            text(&self.phone),
            text(&self.address),
            text(&self.linkedin),
            text(&self.website),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// References that carry at least one identifying field.
    pub fn identified_references(&self) -> Vec<&Reference> {
        self.references
            .iter()
            .filter(|r| r.is_identified())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    #[serde(alias = "cargo")]
    pub role: Option<String>,
    #[serde(alias = "empresa")]
    pub organization: Option<String>,
    #[serde(alias = "fechaInicio")]
    pub start_date: Option<String>,
    #[serde(alias = "fechaFin")]
    pub end_date: Option<String>,
    #[serde(alias = "ubicacion")]
    pub location: Option<String>,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
}

impl Experience {
    pub fn is_blank(&self) -> bool {
        ![
            &self.role,
            &self.organization,
            &self.start_date,
            &self.end_date,
            &self.location,
            &self.description,
        ]
        .into_iter()
        .any(has_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(alias = "titulo")]
    pub credential: Option<String>,
    #[serde(alias = "institucion")]
    pub institution: Option<String>,
    #[serde(alias = "fechaInicio")]
    pub start_date: Option<String>,
    #[serde(alias = "fechaFin")]
    pub end_date: Option<String>,
    #[serde(alias = "ubicacion")]
    pub location: Option<String>,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
}

impl Education {
    pub fn is_blank(&self) -> bool {
        ![
            &self.credential,
            &self.institution,
            &self.start_date,
            &self.end_date,
            &self.location,
            &self.description,
        ]
        .into_iter()
        .any(has_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skill {
    #[serde(alias = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Language {
    #[serde(alias = "nombre", alias = "idioma")]
    pub name: String,
    /// Proficiency; when absent the language renders as a bare label.
    #[serde(alias = "nivel")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    #[serde(alias = "nombre")]
    pub name: Option<String>,
    #[serde(alias = "entidad", alias = "emisor")]
    pub issuer: Option<String>,
    #[serde(alias = "fecha")]
    pub date: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(alias = "nombre")]
    pub name: Option<String>,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
    #[serde(alias = "tecnologias")]
    pub technologies: Vec<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reference {
    #[serde(alias = "nombre")]
    pub name: Option<String>,
    #[serde(alias = "cargo")]
    pub role: Option<String>,
    #[serde(alias = "empresa")]
    pub organization: Option<String>,
    #[serde(alias = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Reference {
    pub fn is_identified(&self) -> bool {
        [
            &self.name,
            &self.role,
            &self.organization,
            &self.phone,
            &self.email,
        ]
        .into_iter()
        .any(has_text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
