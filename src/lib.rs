use log::{debug, warn};
use swc_core::{
    common::{sync::Lrc, SourceMapper, Span, Spanned, DUMMY_SP},
    ecma::{
        ast::*,
        visit::{VisitMut, VisitMutWith},
    },
    plugin::{
        metadata::TransformPluginMetadataContextKind, plugin_transform,
        proxies::TransformPluginProgramMetadata,
    },
};

pub mod config;
pub mod error;

pub use config::Config;
pub use error::ConfigError;

/// Name of the attribute React reads debug locations from.
pub const SOURCE_ATTR: &str = "__source";

const UNKNOWN_FILE: &str = "unknown";

// -----------------------------------------------------------------------------
// Source unit
// -----------------------------------------------------------------------------

/// One parsed input file: the tree, the name it is reported under, and the
/// source map used to turn span offsets into lines.
pub struct SourceUnit {
    pub program: Program,
    pub file_name: String,
    pub source_map: Lrc<dyn SourceMapper>,
}

// -----------------------------------------------------------------------------
// Element classification
// -----------------------------------------------------------------------------

/// The two JSX tag forms that carry an attribute list.
///
/// Closing tags and fragments never reach this type: SWC models them as
/// `JSXClosingElement` and `JSXOpeningFragment`, which have no attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<Foo ...>` with a matching `</Foo>` elsewhere in the tree.
    Opening,
    /// `<Foo ... />`
    SelfClosing,
}

impl ElementKind {
    pub fn of(element: &JSXOpeningElement) -> Self {
        if element.self_closing {
            ElementKind::SelfClosing
        } else {
            ElementKind::Opening
        }
    }
}

/// Counters for one run of the transform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationStats {
    pub opening: usize,
    pub self_closing: usize,
    /// Elements without a source position (synthesized by an earlier pass).
    pub skipped: usize,
}

impl AnnotationStats {
    pub fn annotated(&self) -> usize {
        self.opening + self.self_closing
    }
}

// -----------------------------------------------------------------------------
// Attribute builder
// -----------------------------------------------------------------------------

/// Builds `__source={{ fileName: "<file_name>", lineNumber: <line> }}`.
pub fn source_attr(file_name: &str, line: usize) -> JSXAttrOrSpread {
    let file_name_prop = PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
        key: PropName::Ident(IdentName::new("fileName".into(), DUMMY_SP)),
        value: Box::new(Expr::Lit(Lit::Str(Str {
            span: DUMMY_SP,
            value: file_name.into(),
            raw: None,
        }))),
    })));
    let line_number_prop = PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
        key: PropName::Ident(IdentName::new("lineNumber".into(), DUMMY_SP)),
        value: Box::new(Expr::Lit(Lit::Num(Number {
            span: DUMMY_SP,
            value: line as f64,
            raw: None,
        }))),
    })));

    JSXAttrOrSpread::JSXAttr(JSXAttr {
        span: DUMMY_SP,
        name: JSXAttrName::Ident(IdentName::new(SOURCE_ATTR.into(), DUMMY_SP)),
        value: Some(JSXAttrValue::JSXExprContainer(JSXExprContainer {
            span: DUMMY_SP,
            expr: JSXExpr::Expr(Box::new(Expr::Object(ObjectLit {
                span: DUMMY_SP,
                props: vec![file_name_prop, line_number_prop],
            }))),
        })),
    })
}

// -----------------------------------------------------------------------------
// Transform
// -----------------------------------------------------------------------------

pub struct JsxSourceTransform {
    file_name: String,
    source_map: Lrc<dyn SourceMapper>,
    stats: AnnotationStats,
}

impl JsxSourceTransform {
    pub fn new(file_name: impl Into<String>, source_map: Lrc<dyn SourceMapper>) -> Self {
        Self {
            file_name: file_name.into(),
            source_map,
            stats: AnnotationStats::default(),
        }
    }

    pub fn stats(&self) -> AnnotationStats {
        self.stats
    }

    /// 1-based line of the first character of `span`.
    fn line_number(&self, span: Span) -> Option<usize> {
        if span.is_dummy() {
            return None;
        }
        Some(self.source_map.lookup_char_pos(span.lo()).line)
    }
}

impl VisitMut for JsxSourceTransform {
    // Element children live on `JSXElement` and are reached by the default
    // recursion; only attribute values and type args hang off the opening tag.
    fn visit_mut_jsx_opening_element(&mut self, node: &mut JSXOpeningElement) {
        node.visit_mut_children_with(self);

        let kind = ElementKind::of(node);
        let Some(line) = self.line_number(node.span) else {
            debug!("{}: no position for {:?} element, left as is", self.file_name, kind);
            self.stats.skipped += 1;
            return;
        };

        node.attrs.push(source_attr(&self.file_name, line));
        match kind {
            ElementKind::Opening => self.stats.opening += 1,
            ElementKind::SelfClosing => self.stats.self_closing += 1,
        }
    }
}

/// Appends a `__source` attribute to every JSX element of `unit`.
///
/// Existing attributes are kept in order and never inspected, so running this
/// twice leaves two `__source` attributes on each element.
pub fn annotate(unit: SourceUnit) -> SourceUnit {
    let SourceUnit {
        mut program,
        file_name,
        source_map,
    } = unit;

    let mut transform = JsxSourceTransform::new(file_name.clone(), source_map.clone());
    program.visit_mut_with(&mut transform);

    let stats = transform.stats();
    debug!(
        "{}: added {} to {} element(s) ({} opening, {} self-closing, {} skipped)",
        file_name,
        SOURCE_ATTR,
        stats.annotated(),
        stats.opening,
        stats.self_closing,
        stats.skipped
    );

    SourceUnit {
        program,
        file_name,
        source_map,
    }
}

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

/// Picks the name written into `fileName`: the configured override, then the
/// name the host reported, then the file the program's span points into.
fn resolve_file_name(
    config: &Config,
    host_file_name: Option<String>,
    program: &Program,
    source_map: &dyn SourceMapper,
) -> String {
    if let Some(name) = &config.file_name {
        return name.clone();
    }
    if let Some(name) = host_file_name {
        return name;
    }
    let span = program.span();
    if span.is_dummy() {
        return UNKNOWN_FILE.to_string();
    }
    source_map.lookup_char_pos(span.lo()).file.name.to_string()
}

#[plugin_transform]
pub fn process_transform(program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let config = match metadata.get_transform_plugin_config() {
        Some(raw) => Config::from_json(&raw).unwrap_or_else(|err| {
            warn!("ignoring plugin config: {}", err);
            Config::default()
        }),
        None => Config::default(),
    };
    let host_file_name = metadata.get_context(&TransformPluginMetadataContextKind::Filename);

    let source_map: Lrc<dyn SourceMapper> = Lrc::new(metadata.source_map);
    let file_name = resolve_file_name(&config, host_file_name, &program, &*source_map);

    annotate(SourceUnit {
        program,
        file_name,
        source_map,
    })
    .program
}
