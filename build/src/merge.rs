//! Folding generated units back into their source files.
//!
//! A struct can only be declared once, so the fields of every unit are
//! spliced into the partial struct itself and the accessor blocks are placed
//! next to it. The result is meant to be pulled in with `include!`.

use crate::generate::GeneratedUnit;
use crate::source::{ModulePath, SourceFile};

/// Merge the units belonging to a source file into a copy of its syntax tree.
///
/// Units of other modules are ignored. Inner attributes of the file are
/// dropped since `include!` does not accept them.
pub fn merge(source: &SourceFile, units: &[GeneratedUnit]) -> syn::File {
    let mut syntax = source.syntax().clone();
    syntax.shebang = None;
    syntax.attrs.clear();
    merge_items(&mut syntax.items, source.module(), units);
    syntax
}

fn merge_items(items: &mut Vec<syn::Item>, module: &ModulePath, units: &[GeneratedUnit]) {
    let local: Vec<&GeneratedUnit> = units.iter().filter(|unit| unit.module() == module).collect();

    for item in items.iter_mut() {
        match item {
            syn::Item::Struct(item) => {
                let syn::Fields::Named(named) = &mut item.fields else {
                    continue;
                };
                let mut extended = false;
                for unit in local.iter().filter(|unit| *unit.target() == item.ident) {
                    named.named.extend(unit.fields().iter().cloned());
                    extended = true;
                }
                // Field-level allows are not honored once the struct went
                // through attribute and derive expansion.
                if extended {
                    item.attrs.push(syn::parse_quote!(#[allow(non_snake_case)]));
                }
            }
            syn::Item::Mod(syn::ItemMod { ident, content: Some((_, content)), .. }) => {
                merge_items(content, &module.join(&ident.to_string()), units);
            }
            _ => {}
        }
    }

    items.extend(local.into_iter().map(|unit| syn::Item::Impl(unit.block().clone())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::generate::Generator;
    use crate::source::SourceSet;

    const CALC: &str = "
        #![allow(dead_code)]
        use lazyprop::{lazy_property, partial};

        #[partial]
        #[derive(Default)]
        pub struct Calc { pub a: i32, pub b: i32 }

        #[partial]
        impl Calc {
            #[lazy_property(\"Sum\", thread_safe = true)]
            fn get_sum(&self) -> i32 { self.a + self.b }
        }

        pub mod nested {
            use lazyprop::{lazy_property, partial};

            #[partial]
            pub struct Counter { pub n: u32 }

            #[partial]
            impl Counter {
                #[lazy_property(\"Next\")]
                fn next(&self) -> u32 { self.n + 1 }
            }
        }
    ";

    fn merged(text: &str) -> String {
        let mut set = SourceSet::new();
        let file = SourceFile::parse("calc.rs", "crate::calc".parse().unwrap(), text).unwrap();
        set.push(file).unwrap();

        let units = Generator::new(&Config::default()).generate(&set);
        prettyplease::unparse(&merge(&set.files()[0], &units))
    }

    #[test]
    fn test_fields_and_blocks_land_in_their_module() {
        let text = merged(CALC);
        assert!(!text.contains("#![allow(dead_code)]"));

        let (outer, inner) = text.split_once("pub mod nested").unwrap();
        assert!(outer.contains("pub b: i32,"));
        assert!(outer.contains("_sumStorage: ::lazyprop::internal::Storage<i32>"));
        assert!(outer.contains("_sumMutex: ::lazyprop::internal::Lock"));
        assert!(outer.contains("#[allow(non_snake_case)]\npub struct Calc"));
        assert!(inner.contains("_nextStorage: ::lazyprop::internal::Storage<u32>"));
        assert!(inner.contains("pub fn Next(&self) -> &u32"));

        // The block of the outer struct follows the module, at the end of the file.
        let (counter, tail) = inner.split_once("pub fn Next").unwrap();
        assert!(!counter.contains("_sumStorage"));
        assert!(tail.contains("pub fn Sum(&self) -> &i32"));
    }

    #[test]
    fn test_file_without_units_is_unchanged() {
        let text = "pub struct Plain { a: u8 }\nimpl Plain { fn a(&self) -> u8 { self.a } }";
        let expected = prettyplease::unparse(&syn::parse_file(text).unwrap());
        assert_eq!(merged(text), expected);
        assert!(!merged(text).contains("non_snake_case"));
    }
}
