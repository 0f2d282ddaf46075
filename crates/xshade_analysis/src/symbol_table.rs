//! Scoped symbol table with function-overload grouping.

use std::collections::HashMap;
use thiserror::Error;
use xshade_ast::{DataType, IndexedSemantic, TextureType, TypeDenoter};

/// A resolved symbol.
#[derive(Clone, Debug)]
pub enum Symbol {
    Variable {
        ty: TypeDenoter,
        semantic: Option<IndexedSemantic>,
        /// Name of the owning cbuffer/tbuffer, when declared inside one.
        buffer_ident: Option<String>,
    },
    Texture {
        texture_type: TextureType,
        color_type: Option<DataType>,
    },
    Sampler,
    /// A struct type; details live in the analyzer's struct registry.
    Struct,
    Alias {
        ty: TypeDenoter,
    },
    /// A function-overload group.
    Functions(Vec<FunctionSig>),
}

/// Signature of one function overload, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSig {
    pub params: Vec<TypeDenoter>,
    pub return_type: TypeDenoter,
    pub has_body: bool,
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("identifier '{0}' is already declared in this scope")]
pub struct RedeclarationError(pub String);

/// How a registration landed in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registered {
    New,
    /// The identifier shadows a declaration from an outer scope.
    Shadowing,
    /// The function joined an existing overload group.
    Overloaded,
}

/// A stack of frames mapping identifiers to declarations. `fetch` walks
/// outward; `register` enters the innermost frame.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn close_scope(&mut self) {
        self.scopes.pop();
    }

    /// Number of open scopes, for balance checks.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Registers a symbol in the innermost frame. Functions with the
    /// same name form an overload group; any other same-frame collision
    /// is a re-declaration error. Shadowing an outer frame is reported
    /// back so the caller can warn.
    pub fn register(&mut self, name: &str, symbol: Symbol) -> Result<Registered, RedeclarationError> {
        let shadows = self.scopes.len() > 1
            && self.scopes[..self.scopes.len() - 1]
                .iter()
                .any(|scope| scope.contains_key(name));

        let scope = self
            .scopes
            .last_mut()
            .expect("symbol registered without an open scope");

        match (scope.get_mut(name), symbol) {
            (Some(Symbol::Functions(group)), Symbol::Functions(mut sigs)) => {
                group.append(&mut sigs);
                Ok(Registered::Overloaded)
            }
            (Some(_), _) => Err(RedeclarationError(name.to_string())),
            (None, symbol) => {
                scope.insert(name.to_string(), symbol);
                Ok(if shadows {
                    Registered::Shadowing
                } else {
                    Registered::New
                })
            }
        }
    }

    /// Walks the frames outward for the innermost declaration.
    pub fn fetch(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Narrows the result to type symbols (structs and aliases).
    pub fn fetch_type(&self, name: &str) -> Option<&Symbol> {
        self.fetch(name)
            .filter(|s| matches!(s, Symbol::Struct | Symbol::Alias { .. }))
    }

    pub fn fetch_functions(&self, name: &str) -> Option<&[FunctionSig]> {
        match self.fetch(name) {
            Some(Symbol::Functions(group)) => Some(group),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_ty() -> TypeDenoter {
        TypeDenoter::Base(DataType::Scalar(xshade_ast::ScalarType::Float))
    }

    fn var(ty: TypeDenoter) -> Symbol {
        Symbol::Variable {
            ty,
            semantic: None,
            buffer_ident: None,
        }
    }

    fn sig(params: usize) -> Symbol {
        Symbol::Functions(vec![FunctionSig {
            params: vec![float_ty(); params],
            return_type: float_ty(),
            has_body: true,
        }])
    }

    #[test]
    fn fetch_walks_outward() {
        let mut table = SymbolTable::new();
        table.open_scope();
        table.register("x", var(float_ty())).unwrap();
        table.open_scope();
        assert!(table.fetch("x").is_some());
        table.close_scope();
        table.close_scope();
    }

    #[test]
    fn redeclaration_in_same_frame_is_an_error() {
        let mut table = SymbolTable::new();
        table.open_scope();
        table.register("x", var(float_ty())).unwrap();
        assert!(table.register("x", var(float_ty())).is_err());
    }

    #[test]
    fn shadowing_is_flagged() {
        let mut table = SymbolTable::new();
        table.open_scope();
        table.register("x", var(float_ty())).unwrap();
        table.open_scope();
        assert_eq!(
            table.register("x", var(float_ty())).unwrap(),
            Registered::Shadowing
        );
    }

    #[test]
    fn functions_form_overload_groups() {
        let mut table = SymbolTable::new();
        table.open_scope();
        assert_eq!(table.register("f", sig(1)).unwrap(), Registered::New);
        assert_eq!(table.register("f", sig(2)).unwrap(), Registered::Overloaded);
        assert_eq!(table.fetch_functions("f").unwrap().len(), 2);
    }

    #[test]
    fn function_and_variable_collide() {
        let mut table = SymbolTable::new();
        table.open_scope();
        table.register("f", sig(1)).unwrap();
        assert!(table.register("f", var(float_ty())).is_err());
    }

    #[test]
    fn scope_depth_balances() {
        let mut table = SymbolTable::new();
        table.open_scope();
        table.open_scope();
        table.close_scope();
        table.close_scope();
        assert_eq!(table.depth(), 0);
    }
}
