//! Seeded CODEOWNERS and path generation for benchmarks and tests.
//!
//! The same [`GeneratorConfig`] always yields the same table.

use crate::parse::{OwnershipRule, OwnershipTable, render};
use rand::prelude::*;
use rand::rngs::StdRng;

const GLOBS: &[&str] = &[
    "*.{ext}",
    "**/*.{ext}",
    "/{dir}/",
    "{dir}/**",
    "/{dir}/*.{ext}",
    "/src/{dir}/",
    "src/**/*.{ext}",
    "{dir}/**/test_*.{ext}",
    "docs/**/*.md",
];
const EXTENSIONS: &[&str] = &["rs", "toml", "md", "proto", "sql", "sh", "yml", "json"];
const DIRECTORIES: &[&str] = &[
    "src", "crates", "tests", "docs", "deploy", "migrations", "proto", "tools",
];
const STEMS: &[&str] = &["main", "lib", "mod", "schema", "README", "build"];
const LOGINS: &[&str] = &["ana", "bruno", "chen", "dara", "eitan", "fumiko"];
const ORGANIZATIONS: &[&str] = &["acme", "initech", "umbrella"];
const TEAMS: &[&str] = &["api", "storage", "release", "sre", "docs", "security"];

/// Catch-all rule placed first so every path has an owner.
const FALLBACK_OWNER: &str = "@acme/everyone";

/// Configuration for generating CODEOWNERS tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of rules, the catch-all included.
    pub num_rules: usize,
    /// Upper bound on owners per rule.
    pub max_owners_per_rule: usize,
    /// Percentages of user and team owners; the rest are email addresses.
    pub owner_mix: (u32, u32),
    /// Seed for the random generator.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_rules: 100,
            max_owners_per_rule: 4,
            owner_mix: (50, 30),
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Creates a config with `num_rules` rules.
    pub fn new(num_rules: usize) -> Self {
        Self {
            num_rules,
            ..Default::default()
        }
    }

    pub fn small() -> Self {
        Self::new(10)
    }

    pub fn medium() -> Self {
        Self::new(100)
    }

    pub fn large() -> Self {
        Self::new(1_000)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the maximum owners per rule. Never below one.
    pub fn with_max_owners(mut self, max: usize) -> Self {
        self.max_owners_per_rule = max.max(1);
        self
    }
}

struct Generator<'c> {
    config: &'c GeneratorConfig,
    rng: StdRng,
}

impl<'c> Generator<'c> {
    fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn choose(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn pattern(&mut self) -> String {
        let glob = self.choose(GLOBS);
        let ext = self.choose(EXTENSIONS);
        let dir = self.choose(DIRECTORIES);
        glob.replace("{ext}", ext).replace("{dir}", dir)
    }

    fn owner(&mut self) -> String {
        let (users, teams) = self.config.owner_mix;
        let roll = self.rng.random_range(0..100);
        if roll < users {
            format!("@{}", self.choose(LOGINS))
        } else if roll < users + teams {
            let org = self.choose(ORGANIZATIONS);
            format!("@{}/{}", org, self.choose(TEAMS))
        } else {
            format!("{}@example.com", self.choose(LOGINS))
        }
    }

    fn rule(&mut self) -> OwnershipRule {
        let pattern = self.pattern();
        let count = self.rng.random_range(1..=self.config.max_owners_per_rule);
        let owners: Vec<String> = (0..count).map(|_| self.owner()).collect();
        OwnershipRule::new(pattern, owners)
    }
}

/// Generates a rule table.
pub fn generate_table(config: &GeneratorConfig) -> OwnershipTable {
    let mut generator = Generator::new(config);
    let rules = (0..config.num_rules)
        .map(|i| {
            if i == 0 {
                OwnershipRule::new("**", [FALLBACK_OWNER])
            } else {
                generator.rule()
            }
        })
        .collect();
    OwnershipTable::new(rules)
}

/// Generates CODEOWNERS text.
pub fn generate(config: &GeneratorConfig) -> String {
    render(&generate_table(config))
}

/// Generates `count` file paths up to three directories deep.
pub fn generate_paths(count: usize, seed: u64) -> Vec<String> {
    let config = GeneratorConfig::default().with_seed(seed);
    let mut generator = Generator::new(&config);
    (0..count)
        .map(|_| {
            let depth = generator.rng.random_range(0..4);
            let mut path = String::new();
            for _ in 0..depth {
                path.push_str(generator.choose(DIRECTORIES));
                path.push('/');
            }
            let stem = generator.choose(STEMS);
            let ext = generator.choose(EXTENSIONS);
            path.push_str(&format!("{}.{}", stem, ext));
            path
        })
        .collect()
}
