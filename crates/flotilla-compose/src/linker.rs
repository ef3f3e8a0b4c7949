//! Cross-module service-discovery environment derivation.
//!
//! A declarative rule table keyed on (role, peer role) injects connection
//! variables into a module when a matching peer is present in the resolved
//! set. New peer relationships are new table rows, not new code paths.
//! Variables a module declares itself always win over derived ones.

use std::collections::BTreeMap;

use crate::module::{ModuleDescriptor, ModuleRole};

/// One environment variable template within a link rule.
#[derive(Debug)]
struct VarTemplate {
    /// Variable name; `{peer}` expands to the upper-cased peer name.
    key: &'static str,
    /// Variable value; `{host}` and `{port}` expand per peer.
    value: &'static str,
}

/// Wiring rule: when a module with `role` shares a deployment with a peer
/// of `peer_role`, the listed variables are derived for it.
#[derive(Debug)]
struct LinkRule {
    role: ModuleRole,
    peer_role: ModuleRole,
    /// Conventional port used when the peer declares no port mapping.
    fallback_port: &'static str,
    vars: &'static [VarTemplate],
}

const LINK_RULES: &[LinkRule] = &[
    LinkRule {
        role: ModuleRole::Application,
        peer_role: ModuleRole::Database,
        fallback_port: "5432",
        vars: &[
            VarTemplate {
                key: "DB_HOST",
                value: "{host}",
            },
            VarTemplate {
                key: "DB_PORT",
                value: "{port}",
            },
            VarTemplate {
                key: "DB_NAME",
                value: "${DB_NAME:-app}",
            },
            VarTemplate {
                key: "DB_USER",
                value: "${DB_USER:-app}",
            },
            VarTemplate {
                key: "DB_PASSWORD",
                value: "${DB_PASSWORD:-changeme}",
            },
        ],
    },
    LinkRule {
        role: ModuleRole::Application,
        peer_role: ModuleRole::Cache,
        fallback_port: "6379",
        vars: &[
            VarTemplate {
                key: "CACHE_HOST",
                value: "{host}",
            },
            VarTemplate {
                key: "CACHE_PORT",
                value: "{port}",
            },
        ],
    },
    LinkRule {
        role: ModuleRole::Proxy,
        peer_role: ModuleRole::Application,
        fallback_port: "80",
        vars: &[VarTemplate {
            key: "{peer}_UPSTREAM",
            value: "{host}:{port}",
        }],
    },
];

/// Derives discovery variables for `module` from the peers present in the
/// full resolved set (not the request set — transitively pulled-in peers
/// count too). Pairs not covered by the rule table yield nothing, and a
/// module never links to itself.
#[must_use]
pub fn derive_env(
    module: &ModuleDescriptor,
    peers: &[&ModuleDescriptor],
) -> BTreeMap<String, String> {
    let mut derived = BTreeMap::new();
    let Some(role) = module.role else {
        return derived;
    };

    for rule in LINK_RULES.iter().filter(|r| r.role == role) {
        for peer in peers {
            if peer.name == module.name || peer.role != Some(rule.peer_role) {
                continue;
            }
            apply_rule(rule, peer, &mut derived);
        }
    }
    derived
}

fn apply_rule(rule: &LinkRule, peer: &ModuleDescriptor, out: &mut BTreeMap<String, String>) {
    let host = peer.network_alias();
    let port = peer.first_container_port().unwrap_or(rule.fallback_port);
    let peer_upper = peer.name.to_uppercase();

    for var in rule.vars {
        let key = var.key.replace("{peer}", &peer_upper);
        let value = var.value.replace("{host}", host).replace("{port}", port);
        let _ = out.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str, role: Option<ModuleRole>, yaml: &str) -> ModuleDescriptor {
        let mut descriptor: ModuleDescriptor = serde_yaml::from_str(yaml).expect("should parse");
        descriptor.name = name.into();
        descriptor.role = role;
        descriptor
    }

    #[test]
    fn module_without_role_gets_nothing() {
        let app = module("app", None, "docker:\n  image: app\n");
        let db = module("db", Some(ModuleRole::Database), "docker:\n  image: pg\n");
        assert!(derive_env(&app, &[&app, &db]).is_empty());
    }

    #[test]
    fn application_links_to_database_peer() {
        let app = module("app", Some(ModuleRole::Application), "docker:\n  image: app\n");
        let db = module(
            "db",
            Some(ModuleRole::Database),
            "docker:\n  image: pg\n  container_name: db_primary\n  ports: [\"3306:3306\"]\n",
        );

        let env = derive_env(&app, &[&app, &db]);
        assert_eq!(env.get("DB_HOST").map(String::as_str), Some("db_primary"));
        assert_eq!(env.get("DB_PORT").map(String::as_str), Some("3306"));
        assert_eq!(env.get("DB_NAME").map(String::as_str), Some("${DB_NAME:-app}"));
        assert_eq!(env.get("DB_USER").map(String::as_str), Some("${DB_USER:-app}"));
        assert_eq!(
            env.get("DB_PASSWORD").map(String::as_str),
            Some("${DB_PASSWORD:-changeme}")
        );
    }

    #[test]
    fn database_without_ports_uses_fallback_port() {
        let app = module("app", Some(ModuleRole::Application), "docker:\n  image: app\n");
        let db = module("db", Some(ModuleRole::Database), "docker:\n  image: pg\n");

        let env = derive_env(&app, &[&app, &db]);
        assert_eq!(env.get("DB_HOST").map(String::as_str), Some("db"));
        assert_eq!(env.get("DB_PORT").map(String::as_str), Some("5432"));
    }

    #[test]
    fn application_links_to_cache_peer() {
        let app = module("app", Some(ModuleRole::Application), "docker:\n  image: app\n");
        let cache = module("redis", Some(ModuleRole::Cache), "docker:\n  image: redis\n");

        let env = derive_env(&app, &[&app, &cache]);
        assert_eq!(env.get("CACHE_HOST").map(String::as_str), Some("redis"));
        assert_eq!(env.get("CACHE_PORT").map(String::as_str), Some("6379"));
    }

    #[test]
    fn proxy_gets_one_upstream_per_backend() {
        let proxy = module("edge", Some(ModuleRole::Proxy), "docker:\n  image: nginx\n");
        let app = module(
            "app",
            Some(ModuleRole::Application),
            "docker:\n  image: app\n  ports: [\"8080:8080\"]\n",
        );
        let api = module("api", Some(ModuleRole::Application), "docker:\n  image: api\n");

        let env = derive_env(&proxy, &[&proxy, &app, &api]);
        assert_eq!(env.get("APP_UPSTREAM").map(String::as_str), Some("app:8080"));
        assert_eq!(env.get("API_UPSTREAM").map(String::as_str), Some("api:80"));
    }

    #[test]
    fn uncovered_pair_yields_nothing() {
        let db = module("db", Some(ModuleRole::Database), "docker:\n  image: pg\n");
        let cache = module("redis", Some(ModuleRole::Cache), "docker:\n  image: redis\n");
        assert!(derive_env(&db, &[&db, &cache]).is_empty());
    }

    #[test]
    fn module_never_links_to_itself() {
        let app = module("app", Some(ModuleRole::Application), "docker:\n  image: app\n");
        assert!(derive_env(&app, &[&app]).is_empty());
    }
}
