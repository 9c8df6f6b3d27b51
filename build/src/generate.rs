use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use quote::ToTokens;

use crate::config::Config;
use crate::error::Result;
use crate::filter;
use crate::marker;
use crate::resolve::{self, CandidateMethod};
use crate::semantic::SemanticModel;
use crate::sink::OutputSink;
use crate::source::{ModulePath, SourceSet};
use crate::synth::{self, Members};

/// The generated members of one annotated method.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    key: String,
    module: ModulePath,
    target: syn::Ident,
    target_generics: syn::Generics,
    method: syn::Ident,
    members: Members,
}

impl GeneratedUnit {
    /// The key the unit is registered under, unique within the crate.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The module of the extended struct.
    pub fn module(&self) -> &ModulePath {
        &self.module
    }

    /// The extended struct.
    pub fn target(&self) -> &syn::Ident {
        &self.target
    }

    /// The method the unit was generated from.
    pub fn method(&self) -> &syn::Ident {
        &self.method
    }

    /// The backing fields to merge into the struct.
    pub fn fields(&self) -> &[syn::Field] {
        &self.members.fields
    }

    /// The impl block with the accessors.
    pub fn block(&self) -> &syn::ItemImpl {
        &self.members.block
    }

    /// The unit as a partial struct declaration followed by the partial impl
    /// block.
    pub fn to_file(&self, config: &Config) -> syn::File {
        let krate = config.krate();
        let target = &self.target;
        let generics = &self.target_generics;
        let where_clause = &generics.where_clause;
        let fields = &self.members.fields;
        let block = &self.members.block;
        syn::parse_quote! {
            #[::#krate::partial]
            struct #target #generics #where_clause {
                #(#fields,)*
            }

            #block
        }
    }

    /// The rendered text of the unit.
    pub fn text(&self, config: &Config) -> String {
        crate::render(&self.to_file(config))
    }
}

/// Runs generation passes over source snapshots.
#[derive(Debug, Clone)]
pub struct Generator<'a> {
    config: &'a Config,
}

impl<'a> Generator<'a> {
    /// Create a generator with the given configuration.
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run a full pass and register every unit with the sink.
    ///
    /// The pass depends on nothing but the snapshot and the configuration.
    /// Units come out ordered by module, struct, method and self type. When
    /// impl blocks for different type arguments of one struct define the same
    /// method, every unit after the first gets a counter in its key
    /// (`Type.method.2.g.rs`).
    pub fn run(&self, sources: &SourceSet, sink: &mut dyn OutputSink) -> Result<Vec<GeneratedUnit>> {
        marker::emit(self.config, sink)?;

        let units = self.generate(sources);
        for unit in &units {
            tracing::debug!(
                key = unit.key(),
                properties = unit.block().items.len(),
                "registering unit"
            );
            sink.add(unit.key(), unit.text(self.config))?;
        }

        Ok(units)
    }

    /// Produce the units of a snapshot without registering them.
    pub fn generate(&self, sources: &SourceSet) -> Vec<GeneratedUnit> {
        let model = SemanticModel::build(sources, self.config);

        // Impl blocks of one struct for different type arguments may define
        // methods of the same name, so the self type is part of the group.
        let mut candidates = 0;
        let mut groups: BTreeMap<(String, String), CandidateMethod> = BTreeMap::new();
        for node in sources.methods() {
            if !filter::is_candidate(node.item, node.method) {
                continue;
            }

            candidates += 1;
            let Some(candidate) = resolve::resolve(&node, &model) else {
                continue;
            };

            if candidate.specs.is_empty() {
                tracing::trace!(method = %candidate.method, "no usable markers");
                continue;
            }

            let self_ty = candidate.self_ty.to_token_stream().to_string();
            match groups.entry((unit_stem(&candidate), self_ty)) {
                Entry::Vacant(entry) => {
                    entry.insert(candidate);
                }
                Entry::Occupied(mut entry) => {
                    entry.get_mut().specs.extend(candidate.specs);
                }
            }
        }

        tracing::debug!(
            files = sources.files().len(),
            candidates,
            units = groups.len(),
            "generation pass finished"
        );

        let mut taken: BTreeMap<String, usize> = BTreeMap::new();
        groups
            .into_iter()
            .map(|((stem, _), candidate)| {
                let count = taken.entry(stem.clone()).or_default();
                *count += 1;
                let key = match *count {
                    1 => format!("{stem}.g.rs"),
                    n => format!("{stem}.{n}.g.rs"),
                };
                let members = synth::synthesize(&candidate, self.config);
                GeneratedUnit {
                    key,
                    module: candidate.module,
                    target: candidate.target,
                    target_generics: candidate.target_generics,
                    method: candidate.method,
                    members,
                }
            })
            .collect()
    }
}

/// The unit key without its extension: module, struct and method,
/// dot-separated.
fn unit_stem(candidate: &CandidateMethod) -> String {
    let module = candidate.module.dotted();
    let mut stem = String::new();
    if !module.is_empty() {
        stem.push_str(&module);
        stem.push('.');
    }
    stem.push_str(&format!("{}.{}", candidate.target, candidate.method));
    stem
}
