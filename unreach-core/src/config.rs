use serde::{Deserialize, Serialize};

use crate::index::IndexSymbolKind;
use crate::types::DeclKind;

/// Top-level analysis configuration, matching `.unreach.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub unreach: UnreachSection,
    #[serde(default)]
    pub entry_points: EntryPointsSection,
    #[serde(default)]
    pub joiner: JoinerSection,
    #[serde(default)]
    pub graph: GraphSection,
    #[serde(default)]
    pub reachability: ReachabilitySection,
    #[serde(default)]
    pub discovery: DiscoverySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreachSection {
    pub version: String,
}

impl Default for UnreachSection {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
        }
    }
}

/// Configuration driving the ten entry-point heuristics of §4.1. Exposed as
/// data so framework roots and lifecycle method names can be extended
/// without touching the heuristic code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPointsSection {
    /// Type names whose descendants are assumed externally driven (UI view
    /// base, CLI parsable-command, test-case base, serialization-codable).
    pub framework_roots: Vec<String>,
    /// Method names treated as framework lifecycle hooks regardless of
    /// access level (e.g. `viewDidLoad`) or representable-protocol methods
    /// (e.g. `makeUIView`, `updateUIView`).
    pub lifecycle_methods: Vec<String>,
    /// Whether types conforming to a serialization/codable-style protocol
    /// are themselves treated as entry points (open question in the
    /// reference behavior — default follows it: yes).
    pub treat_codable_as_entry_point: bool,
}

impl Default for EntryPointsSection {
    fn default() -> Self {
        Self {
            framework_roots: vec![
                "View".into(),
                "App".into(),
                "ParsableCommand".into(),
                "XCTestCase".into(),
                "Codable".into(),
                "Encodable".into(),
                "Decodable".into(),
            ],
            lifecycle_methods: vec![
                "viewDidLoad".into(),
                "viewWillAppear".into(),
                "viewDidAppear".into(),
                "applicationDidFinishLaunching".into(),
                "applicationWillTerminate".into(),
                "makeUIView".into(),
                "updateUIView".into(),
                "makeCoordinator".into(),
            ],
            treat_codable_as_entry_point: true,
        }
    }
}

/// A single row of the kind-compatibility bridge used by the Symbol
/// Joiner (§4.2, §9 "expose it as data"). `decl_kind` is the syntactic
/// kind; `index_kinds` lists every index-reported kind it may legally
/// match against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindBridgeRow {
    pub decl_kind: DeclKind,
    pub index_kinds: Vec<IndexSymbolKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinerSection {
    /// Fuzzy-window radius in lines around `[start_line, end_line]` used
    /// when no exact-line candidate passes kind compatibility.
    pub fuzzy_window_lines: u32,
    /// Score added when kind compatibility passes (required to pass at all).
    pub kind_match_score: i32,
    /// Score added when base names match.
    pub name_match_score: i32,
    /// The kind-compatibility bridge table (§4.2 step 2).
    pub kind_bridge: Vec<KindBridgeRow>,
}

impl Default for JoinerSection {
    fn default() -> Self {
        Self {
            fuzzy_window_lines: 2,
            kind_match_score: 1000,
            name_match_score: 100,
            kind_bridge: default_kind_bridge(),
        }
    }
}

fn default_kind_bridge() -> Vec<KindBridgeRow> {
    use DeclKind::{Class, Enum, Function, Initializer, Property, Struct, Variable};
    use IndexSymbolKind::{
        Constructor, Function as IFunction, InstanceMethod, InstanceProperty, StaticMethod,
        StaticProperty, Variable as IVariable,
    };
    vec![
        KindBridgeRow {
            decl_kind: Struct,
            index_kinds: vec![IndexSymbolKind::Struct],
        },
        KindBridgeRow {
            decl_kind: Class,
            index_kinds: vec![IndexSymbolKind::Class],
        },
        KindBridgeRow {
            decl_kind: Enum,
            index_kinds: vec![IndexSymbolKind::Enum],
        },
        KindBridgeRow {
            decl_kind: Initializer,
            index_kinds: vec![Constructor],
        },
        KindBridgeRow {
            decl_kind: Function,
            index_kinds: vec![IFunction, InstanceMethod, StaticMethod],
        },
        KindBridgeRow {
            decl_kind: Variable,
            index_kinds: vec![IVariable, InstanceProperty, StaticProperty],
        },
        KindBridgeRow {
            decl_kind: Property,
            index_kinds: vec![IVariable, InstanceProperty, StaticProperty],
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSection {
    /// Safety cap on Tier-A symbolic ascent (§4.3, §9: may be raised if
    /// containment chains run deeper in practice).
    pub tier_a_hop_budget: u32,
}

impl Default for GraphSection {
    fn default() -> Self {
        Self {
            tier_a_hop_budget: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachabilitySection {
    /// `--respect-public-api`: restrict §4.4 Step 1 pruning to properties
    /// whose access level is private or fileprivate. Default: prune
    /// regardless of access level (§4.5).
    pub respect_public_api: bool,
}

impl Default for ReachabilitySection {
    fn default() -> Self {
        Self {
            respect_public_api: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySection {
    /// Directory names skipped during file discovery (§6, default set).
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            exclude_dirs: vec![
                ".build".into(),
                "Pods".into(),
                "Carthage".into(),
                "DerivedData".into(),
            ],
        }
    }
}

impl AnalysisConfig {
    /// Load `.unreach.toml` from `project_root` if present; otherwise
    /// return defaults. Mirrors the teacher's `.homer/config.toml`
    /// convention.
    pub fn load_or_default(project_root: &std::path::Path) -> crate::error::Result<Self> {
        let path = project_root.join(".unreach.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(&path).map_err(|source| crate::error::ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let config: Self =
            toml::from_str(&text).map_err(|source| crate::error::ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kind_bridge_covers_every_decl_kind() {
        let bridge = default_kind_bridge();
        for kind in [
            DeclKind::Struct,
            DeclKind::Class,
            DeclKind::Enum,
            DeclKind::Function,
            DeclKind::Initializer,
            DeclKind::Variable,
            DeclKind::Property,
        ] {
            assert!(
                bridge.iter().any(|row| row.decl_kind == kind),
                "missing bridge row for {kind:?}"
            );
        }
    }

    #[test]
    fn default_exclude_dirs_match_spec() {
        let defaults = DiscoverySection::default();
        let expected: Vec<String> = vec![".build", "Pods", "Carthage", "DerivedData"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(defaults.exclude_dirs, expected);
    }

    #[test]
    fn respect_public_api_defaults_to_prune_regardless() {
        assert!(!ReachabilitySection::default().respect_public_api);
    }
}
