//! The target-language walker. Declarations are discovered by walking the
//! tree-sitter-swift parse tree; a small stack of "current scope name"
//! values records containment so qualified names can be built without an
//! inheritance-based visitor hierarchy (one tagged match per node kind
//! instead).

use std::path::{Path, PathBuf};

use tree_sitter::Node;

use unreach_core::config::EntryPointsSection;
use unreach_core::error::SyntaxError;
use unreach_core::types::{
    AccessLevel, DeclId, DeclKind, Declaration, EntryPointReason, SourceLocation,
};

/// Node kinds the tree-sitter-swift grammar uses for each container-like
/// declaration. Extensions reuse the extended type's own name, per §4.1
/// "using the extended type's name when inside an extension", so they
/// don't introduce a new scope segment.
const CLASS_LIKE_KINDS: &[&str] = &["class_declaration"];
const STRUCT_LIKE_KINDS: &[&str] = &["struct_declaration"];
const ENUM_LIKE_KINDS: &[&str] = &["enum_declaration"];
const EXTENSION_KINDS: &[&str] = &["extension_declaration"];
const FUNCTION_KINDS: &[&str] = &["function_declaration"];
const INIT_KINDS: &[&str] = &["init_declaration"];
const PROPERTY_KINDS: &[&str] = &["property_declaration"];

/// Macro-like attributes that mark a type as persisted (§4.1 heuristic 5).
const PERSISTENCE_ATTRIBUTES: &[&str] = &["@Model", "@Entity", "@Persistent"];

struct WalkContext<'a> {
    file: &'a Path,
    source: &'a str,
    entry_points: &'a EntryPointsSection,
    is_test_file: bool,
    next_id: u32,
    out: Vec<Declaration>,
}

impl WalkContext<'_> {
    fn alloc_id(&mut self) -> DeclId {
        let id = DeclId(self.next_id);
        self.next_id += 1;
        id
    }
}

pub fn parse_file(path: &Path, entry_points: &EntryPointsSection) -> Result<Vec<Declaration>, SyntaxError> {
    let source = std::fs::read_to_string(path).map_err(|err| SyntaxError {
        path: path.to_path_buf(),
        message: format!("failed to read file: {err}"),
    })?;

    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_swift::LANGUAGE.into())
        .map_err(|err| SyntaxError {
            path: path.to_path_buf(),
            message: format!("failed to load grammar: {err}"),
        })?;

    let tree = parser.parse(&source, None).ok_or_else(|| SyntaxError {
        path: path.to_path_buf(),
        message: "tree-sitter returned no parse tree".to_string(),
    })?;

    let is_test_file = path
        .to_string_lossy()
        .to_ascii_lowercase()
        .contains("test");

    let mut ctx = WalkContext {
        file: path,
        source: &source,
        entry_points,
        is_test_file,
        next_id: 0,
        out: Vec::new(),
    };

    let mut scope: Vec<String> = Vec::new();
    walk(tree.root_node(), &mut scope, None, &[], &[], &mut ctx);

    Ok(ctx.out)
}

/// `containing_kind` is the innermost enclosing type's `DeclKind`, used by
/// heuristics 4 (non-private class member) and 9 (view body).
/// `container_conformances` lists the innermost enclosing type's
/// inheritance-clause names; `container_attributes` lists its `@Attribute`
/// tokens, used by heuristic 5's persistence-macro check.
fn walk(
    node: Node,
    scope: &mut Vec<String>,
    containing_kind: Option<DeclKind>,
    container_conformances: &[String],
    container_attributes: &[String],
    ctx: &mut WalkContext,
) {
    let kind = node.kind();

    if CLASS_LIKE_KINDS.contains(&kind) {
        walk_type(node, scope, DeclKind::Class, ctx);
        return;
    }
    if STRUCT_LIKE_KINDS.contains(&kind) {
        walk_type(node, scope, DeclKind::Struct, ctx);
        return;
    }
    if ENUM_LIKE_KINDS.contains(&kind) {
        walk_type(node, scope, DeclKind::Enum, ctx);
        return;
    }
    if EXTENSION_KINDS.contains(&kind) {
        walk_extension(node, scope, ctx);
        return;
    }
    if FUNCTION_KINDS.contains(&kind) {
        walk_function(node, scope, containing_kind, container_conformances, ctx);
        return;
    }
    if INIT_KINDS.contains(&kind) {
        walk_initializer(node, scope, containing_kind, container_conformances, container_attributes, ctx);
        return;
    }
    if PROPERTY_KINDS.contains(&kind) {
        walk_property(node, scope, containing_kind, container_conformances, ctx);
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, scope, containing_kind, container_conformances, container_attributes, ctx);
    }
}

fn walk_type(node: Node, scope: &mut Vec<String>, kind: DeclKind, ctx: &mut WalkContext) {
    let Some(name) = declaration_name(node, ctx.source) else {
        return;
    };
    let location = node_location(node, ctx.file);
    let access = access_level(node, ctx.source);
    let conformances = inheritance_names(node, ctx.source);
    let attributes = attribute_names(node, ctx.source);

    let mut reasons = Vec::new();
    if conformances
        .iter()
        .any(|c| ctx.entry_points.framework_roots.contains(c))
    {
        reasons.push(EntryPointReason::FrameworkRoot);
    }
    if ctx.entry_points.treat_codable_as_entry_point
        && conformances
            .iter()
            .any(|c| c == "Codable" || c == "Encodable" || c == "Decodable")
        && !reasons.contains(&EntryPointReason::FrameworkRoot)
    {
        reasons.push(EntryPointReason::FrameworkRoot);
    }
    if attributes.iter().any(|a| a == "@main") {
        reasons.push(EntryPointReason::MainAttribute);
    }
    if access.is_public_or_open() {
        reasons.push(EntryPointReason::PublicModifier);
    }

    let qualified = qualified_name(scope, &name);
    ctx.out.push(Declaration {
        id: ctx.alloc_id(),
        name: qualified,
        kind,
        location,
        access,
        declared_type: None,
        entry_point_reasons: reasons,
    });

    scope.push(name);
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            walk(child, scope, Some(kind), &conformances, &attributes, ctx);
        }
    }
    scope.pop();
}

fn walk_extension(node: Node, scope: &mut Vec<String>, ctx: &mut WalkContext) {
    let Some(name) = declaration_name(node, ctx.source) else {
        return;
    };
    let conformances = inheritance_names(node, ctx.source);

    scope.push(name);
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            // Extensions don't carry their own declared kind; members
            // resolve against whatever kind the extended type actually is,
            // which the join stage settles via the shared USR (§8 scenario 4).
            // The persistence macro (if any) lives on the original type
            // declaration, not the extension, so no attributes to thread here.
            walk(child, scope, None, &conformances, &[], ctx);
        }
    }
    scope.pop();
}

fn walk_function(
    node: Node,
    scope: &[String],
    containing_kind: Option<DeclKind>,
    container_conformances: &[String],
    ctx: &mut WalkContext,
) {
    let Some(name) = declaration_name(node, ctx.source) else {
        return;
    };
    let location = node_location(node, ctx.file);
    let access = access_level(node, ctx.source);
    let modifiers = modifier_names(node, ctx.source);

    let mut reasons = Vec::new();

    if modifiers.iter().any(|m| m == "override") {
        reasons.push(EntryPointReason::Override);
    }
    if containing_kind == Some(DeclKind::Class) && !access.is_private_or_fileprivate() {
        reasons.push(EntryPointReason::NonPrivateClassMember);
    }
    if ctx
        .entry_points
        .lifecycle_methods
        .iter()
        .any(|m| m == &name)
    {
        reasons.push(EntryPointReason::LifecycleMethod);
    }
    if name == "run"
        && container_conformances
            .iter()
            .any(|c| c == "ParsableCommand")
    {
        reasons.push(EntryPointReason::CommandEntryPoint);
    }
    if ctx.is_test_file && name.to_ascii_lowercase().starts_with("test") {
        reasons.push(EntryPointReason::TestMethod);
    }
    if access.is_public_or_open() {
        reasons.push(EntryPointReason::PublicModifier);
    }

    ctx.out.push(Declaration {
        id: ctx.alloc_id(),
        name: qualified_name(scope, &name),
        kind: DeclKind::Function,
        location,
        access,
        declared_type: None,
        entry_point_reasons: reasons,
    });

    if let Some(body) = node.child_by_field_name("body") {
        let mut inner_scope = scope.to_vec();
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            walk(
                child,
                &mut inner_scope,
                containing_kind,
                container_conformances,
                &[],
                ctx,
            );
        }
    }
}

fn walk_initializer(
    node: Node,
    scope: &[String],
    containing_kind: Option<DeclKind>,
    container_conformances: &[String],
    container_attributes: &[String],
    ctx: &mut WalkContext,
) {
    let location = node_location(node, ctx.file);
    let access = access_level(node, ctx.source);
    let enclosing_has_persistence_macro = container_attributes
        .iter()
        .any(|a| PERSISTENCE_ATTRIBUTES.contains(&a.as_str()));

    let mut reasons = Vec::new();
    if containing_kind == Some(DeclKind::Class) && !access.is_private_or_fileprivate() {
        reasons.push(EntryPointReason::NonPrivateClassMember);
    }
    if access.is_public_or_open() || enclosing_has_persistence_macro {
        reasons.push(EntryPointReason::PersistedInitializer);
    }
    if access.is_public_or_open() {
        reasons.push(EntryPointReason::PublicModifier);
    }

    ctx.out.push(Declaration {
        id: ctx.alloc_id(),
        name: qualified_name(scope, "init"),
        kind: DeclKind::Initializer,
        location,
        access,
        declared_type: None,
        entry_point_reasons: reasons,
    });

    if let Some(body) = node.child_by_field_name("body") {
        let mut inner_scope = scope.to_vec();
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            walk(child, &mut inner_scope, None, container_conformances, &[], ctx);
        }
    }
}

fn walk_property(
    node: Node,
    scope: &[String],
    containing_kind: Option<DeclKind>,
    container_conformances: &[String],
    ctx: &mut WalkContext,
) {
    let Some(name) = declaration_name(node, ctx.source) else {
        return;
    };
    let location = node_location(node, ctx.file);
    let access = access_level(node, ctx.source);
    let declared_type = declared_type_name(node, ctx.source);
    let is_member = containing_kind.is_some();
    let kind = if is_member {
        DeclKind::Property
    } else {
        DeclKind::Variable
    };

    let mut reasons = Vec::new();
    if name == "body"
        && container_conformances
            .iter()
            .any(|c| c == "View" || c == "App")
    {
        reasons.push(EntryPointReason::ViewBody);
    }
    if access.is_public_or_open() {
        reasons.push(EntryPointReason::PublicModifier);
    }

    ctx.out.push(Declaration {
        id: ctx.alloc_id(),
        name: qualified_name(scope, &name),
        kind,
        location,
        access,
        declared_type,
        entry_point_reasons: reasons,
    });
}

// ── Node inspection helpers ─────────────────────────────────────────

fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

fn node_location(node: Node, file: &Path) -> SourceLocation {
    let range = node.range();
    SourceLocation {
        file: file.to_path_buf(),
        start_line: u32::try_from(range.start_point.row).unwrap_or(0) + 1,
        start_column: u32::try_from(range.start_point.column).unwrap_or(0) + 1,
        end_line: u32::try_from(range.end_point.row).unwrap_or(0) + 1,
        end_column: u32::try_from(range.end_point.column).unwrap_or(0) + 1,
    }
}

fn declaration_name(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
}

fn qualified_name(scope: &[String], base: &str) -> String {
    if scope.is_empty() {
        base.to_string()
    } else {
        format!("{}.{base}", scope.join("."))
    }
}

/// Scans the declaration's modifiers for an access-level keyword. Defaults
/// to `internal`, the target language's own default (§3 `AccessLevel`).
fn access_level(node: Node, source: &str) -> AccessLevel {
    for modifier in modifier_names(node, source) {
        match modifier.as_str() {
            "private" => return AccessLevel::Private,
            "fileprivate" => return AccessLevel::FilePrivate,
            "internal" => return AccessLevel::Internal,
            "public" => return AccessLevel::Public,
            "open" => return AccessLevel::Open,
            _ => {}
        }
    }
    AccessLevel::Internal
}

/// Collects the text of every `modifiers`-child token (access levels,
/// `override`, `static`, …) preceding the declaration's keyword.
fn modifier_names(node: Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(modifiers) = find_child_by_kind(node, "modifiers") {
        let mut cursor = modifiers.walk();
        for child in modifiers.children(&mut cursor) {
            names.push(node_text(child, source).trim().to_string());
        }
    }
    names
}

/// Collects `@Attribute` tokens attached to the declaration.
fn attribute_names(node: Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "attribute" {
            names.push(node_text(child, source).trim().to_string());
        }
    }
    names
}

/// Type names listed in the declaration's inheritance/conformance clause.
fn inheritance_names(node: Node, source: &str) -> Vec<String> {
    let Some(clause) = find_child_by_kind(node, "inheritance_specifier")
        .or_else(|| find_child_by_kind(node, "type_inheritance_clause"))
    else {
        return Vec::new();
    };
    let mut names = Vec::new();
    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        if child.kind() == "user_type" || child.kind() == "identifier" || child.kind() == "type_identifier" {
            names.push(node_text(child, source).trim().to_string());
        }
    }
    names
}

/// Best-effort syntactic type name for a stored property's declared type,
/// used only to locate the type's own declaration for pruning (§4.1).
fn declared_type_name(node: Node, source: &str) -> Option<String> {
    find_child_by_kind(node, "type_annotation")
        .and_then(|ann| find_child_by_kind(ann, "user_type").or_else(|| find_child_by_kind(ann, "type_identifier")))
        .map(|n| node_text(n, source).trim().to_string())
}

fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|child| child.kind() == kind)
}
