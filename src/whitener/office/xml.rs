use std::fmt::Display;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};

use crate::error::{Result, WhitenError};

/// Describe la información necesaria para localizar un nodo en el XML de una parte.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldSpec<'a> {
    pub(crate) prefix: Option<&'a str>,
    pub(crate) local_name: &'a str,
    pub(crate) namespace: Option<&'a str>,
}

impl<'a> FieldSpec<'a> {
    pub(crate) const fn new(prefix: &'a str, local_name: &'a str, namespace: &'a str) -> Self {
        Self {
            prefix: Some(prefix),
            local_name,
            namespace: Some(namespace),
        }
    }

    pub(crate) const fn unprefixed(local_name: &'a str, namespace: &'a str) -> Self {
        Self {
            prefix: None,
            local_name,
            namespace: Some(namespace),
        }
    }
}

/// Elemento XML que conserva los nombres cualificados tal como aparecen en la parte.
///
/// `name` y las claves de `attributes` incluyen el prefijo (`w:val`, `r:id`); `namespace`
/// es el URI resuelto del elemento y solo se usa para comparar.
#[derive(Clone, Debug)]
pub(crate) struct Element {
    pub(crate) name: String,
    pub(crate) namespace: Option<String>,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) children: Vec<XmlNode>,
}

#[derive(Clone, Debug)]
pub(crate) enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
    /// Comentarios e instrucciones de procesamiento, que se reescriben sin cambios.
    Verbatim(Event<'static>),
}

/// Parte XML completa: la declaración y lo que rodea a la raíz se guardan como eventos.
#[derive(Clone, Debug)]
pub(crate) struct XmlPart {
    prolog: Vec<Event<'static>>,
    pub(crate) root: Element,
    epilog: Vec<Event<'static>>,
}

impl Element {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub(crate) fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Valor de un atributo buscado por su nombre cualificado.
    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Cambia el valor de un atributo sin moverlo, o lo añade al final.
    pub(crate) fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, current)) => *current = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn has_content(&self) -> bool {
        self.children
            .iter()
            .any(|node| !matches!(node, XmlNode::Text(text) if text.is_empty()))
    }
}

fn invalid_xml(part: &str, reason: impl Display) -> WhitenError {
    WhitenError::PackageOpenFailure(format!("XML inválido en {}: {}", part, reason))
}

fn decode_name(part: &str, bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| invalid_xml(part, e))
}

pub(crate) fn parse_part(name: &str, contents: &[u8]) -> Result<XmlPart> {
    let mut reader = NsReader::from_reader(contents);
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| invalid_xml(name, e))?;
        let namespace = match resolved {
            ResolveResult::Bound(namespace) => {
                Some(String::from_utf8_lossy(namespace.0).into_owned())
            }
            _ => None,
        };

        match event {
            Event::Eof => break,
            Event::Start(start) => stack.push(open_element(name, &start, namespace)?),
            Event::Empty(start) => {
                let element = open_element(name, &start, namespace)?;
                close_element(name, element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| invalid_xml(name, "etiqueta de cierre sin apertura"))?;
                close_element(name, element, &mut stack, &mut root)?;
            }
            other => match stack.last_mut() {
                Some(parent) => parent.children.push(content_node(name, other)?),
                None if root.is_none() => prolog.push(other.into_owned()),
                None => epilog.push(other.into_owned()),
            },
        }
    }

    if !stack.is_empty() {
        return Err(invalid_xml(name, "elementos sin cerrar"));
    }
    let root = root.ok_or_else(|| invalid_xml(name, "no hay elemento raíz"))?;

    Ok(XmlPart {
        prolog,
        root,
        epilog,
    })
}

fn open_element(part: &str, start: &BytesStart<'_>, namespace: Option<String>) -> Result<Element> {
    let mut element = Element::new(decode_name(part, start.name().as_ref())?);
    element.namespace = namespace;

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| invalid_xml(part, e))?;
        let key = decode_name(part, attribute.key.as_ref())?;
        let value = attribute
            .unescape_value()
            .map_err(|e| invalid_xml(part, e))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn close_element(
    part: &str,
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(invalid_xml(part, "más de un elemento raíz"));
    }
    *root = Some(element);
    Ok(())
}

fn content_node(part: &str, event: Event<'_>) -> Result<XmlNode> {
    Ok(match event {
        Event::Text(text) => {
            XmlNode::Text(text.unescape().map_err(|e| invalid_xml(part, e))?.into_owned())
        }
        Event::CData(data) => {
            XmlNode::CData(String::from_utf8_lossy(&data.into_inner()).into_owned())
        }
        other => XmlNode::Verbatim(other.into_owned()),
    })
}

/// Serializa la parte completa. La declaración original y los comentarios se copian tal
/// cual, y los nombres de elementos y atributos conservan su prefijo.
///
/// Un elemento sin contenido se escribe siempre autocerrado, así volver a serializar un
/// campo vaciado produce los mismos bytes.
pub(crate) fn serialize_part(name: &str, part: &XmlPart) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    for event in &part.prolog {
        emit(&mut writer, name, event.clone())?;
    }
    write_element(&mut writer, name, &part.root)?;
    for event in &part.epilog {
        emit(&mut writer, name, event.clone())?;
    }

    Ok(writer.into_inner())
}

fn emit(writer: &mut Writer<Vec<u8>>, part: &str, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| WhitenError::write_failure(part, e))
}

fn write_element(writer: &mut Writer<Vec<u8>>, part: &str, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if !element.has_content() {
        return emit(writer, part, Event::Empty(start));
    }

    emit(writer, part, Event::Start(start))?;
    for node in &element.children {
        match node {
            XmlNode::Element(child) => write_element(writer, part, child)?,
            XmlNode::Text(text) if text.is_empty() => {}
            XmlNode::Text(text) => emit(
                writer,
                part,
                Event::Text(BytesText::from_escaped(partial_escape(text.as_str()))),
            )?,
            XmlNode::CData(text) => emit(writer, part, Event::CData(BytesCData::new(text.as_str())))?,
            XmlNode::Verbatim(event) => emit(writer, part, event.clone())?,
        }
    }
    emit(writer, part, Event::End(BytesEnd::new(element.name.as_str())))
}

/// Comprueba si un elemento coincide con la especificación de búsqueda.
pub(crate) fn element_matches(element: &Element, spec: &FieldSpec<'_>) -> bool {
    if element.local_name() != spec.local_name {
        return false;
    }

    match (spec.namespace, element.namespace.as_deref()) {
        (Some(expected), Some(actual)) => expected == actual,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

pub(crate) fn node_matches(node: &XmlNode, spec: &FieldSpec<'_>) -> bool {
    matches!(node, XmlNode::Element(child) if element_matches(child, spec))
}

pub(crate) fn find_child<'e>(root: &'e Element, spec: &FieldSpec<'_>) -> Option<&'e Element> {
    root.children.iter().find_map(|node| match node {
        XmlNode::Element(child) if element_matches(child, spec) => Some(child),
        _ => None,
    })
}

pub(crate) fn find_child_mut<'e>(
    root: &'e mut Element,
    spec: &FieldSpec<'_>,
) -> Option<&'e mut Element> {
    root.children.iter_mut().find_map(|node| match node {
        XmlNode::Element(child) if element_matches(child, spec) => Some(child),
        _ => None,
    })
}

/// Crea un hijo vacío de `parent`.
///
/// Si el padre ya vive en el mismo espacio de nombres se reutiliza su prefijo, así el
/// elemento nuevo queda ligado a la declaración existente. Si no, el hijo declara el
/// suyo propio.
pub(crate) fn new_child_element(parent: &Element, spec: &FieldSpec<'_>) -> Element {
    let shares_namespace =
        parent.namespace.is_some() && parent.namespace.as_deref() == spec.namespace;
    let prefix = if shares_namespace {
        parent.prefix()
    } else {
        spec.prefix
    };

    let mut child = Element::new(match prefix {
        Some(prefix) => format!("{}:{}", prefix, spec.local_name),
        None => spec.local_name.to_string(),
    });
    child.namespace = spec.namespace.map(str::to_string);

    if !shares_namespace && let Some(namespace) = spec.namespace {
        let declaration = match prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        child.attributes.push((declaration, namespace.to_string()));
    }
    child
}

/// Sustituye todo el contenido de un elemento por un único nodo de texto.
pub(crate) fn set_element_text(element: &mut Element, new_value: &str) {
    element.children = vec![XmlNode::Text(new_value.to_string())];
}

/// Vacía cada nodo de texto directo del elemento sin alterar su estructura.
pub(crate) fn blank_text_nodes(element: &mut Element) {
    for node in element.children.iter_mut() {
        match node {
            XmlNode::Text(text) | XmlNode::CData(text) => text.clear(),
            _ => {}
        }
    }
}

/// Devuelve el texto plano contenido directamente dentro de un elemento.
pub(crate) fn element_text_content(element: &Element) -> String {
    let mut content = String::new();
    for node in &element.children {
        if let XmlNode::Text(text) | XmlNode::CData(text) = node {
            content.push_str(text);
        }
    }
    content.trim().to_string()
}
