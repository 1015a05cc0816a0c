//! Décodage des réponses Subsonic
//!
//! Le serveur répond soit dans son format XML natif (`<subsonic-response>`
//! et attributs), soit en JSON. Les deux formes sont ramenées au même arbre
//! d'éléments : les attributs XML et les champs scalaires JSON deviennent
//! des attributs, les objets et tableaux JSON deviennent des éléments enfants.

use crate::error::Result;
use indexmap::IndexMap;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Attributs d'un élément, dans l'ordre du document
pub type Attributes = IndexMap<String, String>;

/// Champ JSON portant le texte d'un élément (ex: nom d'un genre)
const JSON_TEXT_FIELD: &str = "value";

/// Nom de l'élément racine synthétique quand le JSON n'a pas d'enveloppe
const SYNTHETIC_ROOT: &str = "subsonic-response";

/// Corps brut d'une réponse
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Réponse `application/json` déjà parsée
    Json(Value),
    /// Réponse au format XML natif, non décodée
    Xml(String),
}

/// Élément de l'arbre décodé
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Premier élément (parcours préfixe, racine comprise) portant ce nom
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_first(name))
    }

    /// Tous les éléments portant ce nom, dans l'ordre du document
    pub fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.find_all(name, out);
        }
    }

    /// Valeur d'un attribut
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Réponse décodée
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Décode un corps de réponse, quel que soit son format
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        match payload {
            Payload::Json(value) => Ok(Self::from_json(value)),
            Payload::Xml(text) => Self::from_xml(text),
        }
    }

    /// Décode le format XML natif
    pub fn from_xml(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(start_element(&reader, &e)?),
                Event::Empty(e) => {
                    let element = start_element(&reader, &e)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(e) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&e.decode()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&e.decode()?);
                    }
                }
                Event::GeneralRef(e) => {
                    if let Some(current) = stack.last_mut() {
                        match e.resolve_char_ref()? {
                            Some(c) => current.text.push(c),
                            None => {
                                let name = e.decode()?;
                                if let Some(resolved) = resolve_predefined_entity(&name) {
                                    current.text.push_str(resolved);
                                }
                            }
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        // Document tronqué : on garde ce qui a été ouvert
        while let Some(element) = stack.pop() {
            attach(&mut stack, &mut root, element);
        }

        Ok(Self {
            root: root.unwrap_or_else(|| Element::named(SYNTHETIC_ROOT)),
        })
    }

    /// Décode une réponse JSON
    ///
    /// L'enveloppe `{"subsonic-response": {...}}` devient l'élément racine.
    pub fn from_json(value: &Value) -> Self {
        let root = match value {
            Value::Object(map) if map.len() == 1 => match map.iter().next() {
                Some((name, Value::Object(inner))) => element_from_object(name, inner),
                _ => element_from_object(SYNTHETIC_ROOT, map),
            },
            Value::Object(map) => element_from_object(SYNTHETIC_ROOT, map),
            _ => Element::named(SYNTHETIC_ROOT),
        };
        Self { root }
    }

    /// Élément racine
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Attributs de l'élément racine (`status`, `version`...)
    pub fn root_attributes(&self) -> &Attributes {
        &self.root.attributes
    }

    /// Attributs du premier élément portant ce nom (vide si absent)
    pub fn tag_attributes(&self, name: &str) -> Attributes {
        self.root
            .find_first(name)
            .map(|e| e.attributes.clone())
            .unwrap_or_default()
    }

    /// Attributs de chaque élément portant ce nom
    pub fn tags_attributes(&self, name: &str) -> Vec<Attributes> {
        self.elements(name)
            .into_iter()
            .map(|e| e.attributes.clone())
            .collect()
    }

    /// Texte de chaque élément portant ce nom
    pub fn tags_texts(&self, name: &str) -> Vec<String> {
        self.elements(name)
            .into_iter()
            .map(|e| e.text.clone())
            .collect()
    }

    /// Tous les éléments portant ce nom
    pub fn elements(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.root.find_all(name, &mut out);
        out
    }

    /// Premier élément portant ce nom
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.root.find_first(name)
    }

    /// Statut déclaré par le serveur (`ok` ou `failed`)
    pub fn status(&self) -> Option<&str> {
        self.root.attr("status")
    }

    /// Code et message de l'élément `<error>` d'une réponse `failed`
    pub fn failure(&self) -> Option<(u32, String)> {
        if self.status() != Some("failed") {
            return None;
        }
        let error = self.root.find_first("error")?;
        let code = error
            .attr("code")
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(0);
        let message = error.attr("message").unwrap_or("Unknown error").to_string();
        Some((code, message))
    }
}

fn start_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::named(String::from_utf8_lossy(start.local_name().as_ref()));

    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(reader.decoder())?;
        element.attributes.insert(key, value.into_owned());
    }

    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, mut element: Element) {
    // Le texte est accumulé morceau par morceau (entités comprises)
    let trimmed = element.text.trim();
    if trimmed.len() != element.text.len() {
        element.text = trimmed.to_string();
    }

    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn element_from_object(name: &str, map: &Map<String, Value>) -> Element {
    let mut element = Element::named(name);

    for (key, value) in map {
        match value {
            Value::Object(inner) => element.children.push(element_from_object(key, inner)),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Object(inner) => {
                            element.children.push(element_from_object(key, inner))
                        }
                        scalar => {
                            if let Some(text) = scalar_to_string(scalar) {
                                let mut child = Element::named(key.as_str());
                                child.text = text;
                                element.children.push(child);
                            }
                        }
                    }
                }
            }
            scalar => {
                if let Some(text) = scalar_to_string(scalar) {
                    if key == JSON_TEXT_FIELD {
                        element.text = text;
                    } else {
                        element.attributes.insert(key.clone(), text);
                    }
                }
            }
        }
    }

    element
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
