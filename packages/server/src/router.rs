//! The router: rule table, request matching, and dispatch.
//!
//! A host that intercepts outgoing requests asks `match_rule` whether a
//! request belongs to this engine and `handle` for the answer. The rule
//! table is fixed at construction: read rules always, write rules only
//! under a read-write configuration.

use std::sync::Arc;

use http::Method;

use webmount_fs::FileSystem;

use crate::config::ServerConfig;
use crate::formatter::{Formatter, HtmlFormatter, JsonFormatter};
use crate::handlers;
use crate::request::{Request, Response};
use crate::route::{Modifiers, MountRoute, PathMatch};

/// What part of the mount a rule covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePattern {
    /// `<mount>/<anything>`: resolves to a virtual path.
    Subtree,

    /// `<mount>` exactly, no trailing slash: the canonicalization case.
    Bare,
}

/// One verb+pattern registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub method: Method,
    pub pattern: RulePattern,
}

/// The request-to-filesystem translation engine.
///
/// Holds no mutable state: just the mount, the configuration it was built
/// with, and the shared filesystem collaborator.
pub struct Router {
    route: MountRoute,
    config: ServerConfig,
    fs: Arc<dyn FileSystem>,
    rules: Vec<Rule>,
}

impl Router {
    /// Build the rule table for `config` over `fs`.
    pub fn new(config: ServerConfig, fs: Arc<dyn FileSystem>) -> Self {
        let route = MountRoute::new(&config.route);

        let mut rules = vec![Rule {
            method: Method::GET,
            pattern: RulePattern::Subtree,
        }];
        if config.readwrite {
            rules.push(Rule {
                method: Method::PUT,
                pattern: RulePattern::Subtree,
            });
            rules.push(Rule {
                method: Method::DELETE,
                pattern: RulePattern::Subtree,
            });
            rules.push(Rule {
                method: Method::PUT,
                pattern: RulePattern::Bare,
            });
            rules.push(Rule {
                method: Method::DELETE,
                pattern: RulePattern::Bare,
            });
        }
        rules.push(Rule {
            method: Method::GET,
            pattern: RulePattern::Bare,
        });

        Self {
            route,
            config,
            fs,
            rules,
        }
    }

    /// The mount this router answers for.
    pub fn mount_route(&self) -> &MountRoute {
        &self.route
    }

    /// The registered rules, in registration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Find the rule covering `request`, if any.
    pub fn match_rule(&self, request: &Request) -> Option<&Rule> {
        let matched = self.route.resolve(request.url.path());
        self.rules.iter().find(|rule| {
            rule.method == request.method
                && match rule.pattern {
                    RulePattern::Subtree => matches!(matched, PathMatch::Subtree(_)),
                    RulePattern::Bare => matched == PathMatch::Bare,
                }
        })
    }

    /// Answer `request`, or return `None` when no rule covers it and the
    /// host should fall through to its default handling.
    ///
    /// Never fails: handlers convert every filesystem and stream error
    /// into a response before it reaches this boundary.
    pub async fn handle(&self, request: Request) -> Option<Response> {
        if self.match_rule(&request).is_none() {
            log::debug!(
                "{} {} not covered by {}",
                request.method,
                request.url.path(),
                self.route.as_str()
            );
            return None;
        }

        let matched = self.route.resolve(request.url.path());
        let Request {
            method, url, body, ..
        } = request;

        match matched {
            PathMatch::Bare => {
                let target = self.route.slash_redirect_target(&url);
                log::debug!("redirecting bare mount request to {}", target);
                Some(Response::redirect(&target))
            }
            PathMatch::Subtree(path) => {
                let modifiers = Modifiers::from_url(&url);
                log::debug!("{} {} -> {}", method, url.path(), path);
                let response = match method {
                    Method::GET => {
                        let formatter: &dyn Formatter = if modifiers.json {
                            &JsonFormatter
                        } else {
                            &HtmlFormatter
                        };
                        handlers::serve(
                            self.fs.as_ref(),
                            &self.config,
                            &self.route,
                            &path,
                            formatter,
                            modifiers.download,
                        )
                        .await
                    }
                    Method::PUT => {
                        handlers::update(
                            self.fs.as_ref(),
                            &self.config,
                            &path,
                            body,
                            modifiers.touch,
                            modifiers.folder,
                        )
                        .await
                    }
                    Method::DELETE => handlers::remove(self.fs.as_ref(), &path).await,
                    // match_rule only admits the three verbs above.
                    _ => return None,
                };
                Some(response)
            }
            PathMatch::Miss => None,
        }
    }
}
