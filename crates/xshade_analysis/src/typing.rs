//! Expression typing, identifier resolution, implicit-cast validation,
//! and call resolution.

use crate::analyzer::Analyzer;
use crate::intrinsics::{lookup_intrinsic, refine_by_argument_count};
use crate::symbol_table::{FunctionSig, Symbol};
use xshade_ast::*;
use xshade_common::{codes, ShaderTarget, SourceArea};

enum OverloadError {
    NoMatch,
    Ambiguous,
}

impl<'r, 'log, 's> Analyzer<'r, 'log, 's> {
    /// Follows aliases to a canonical type denoter, reporting unknown
    /// names.
    pub(crate) fn resolve_denoter(&mut self, denoter: &TypeDenoter, area: SourceArea) -> TypeDenoter {
        match denoter {
            TypeDenoter::Alias(name) => match self.symbols.fetch(name).cloned() {
                Some(Symbol::Alias { ty }) => ty,
                Some(Symbol::Struct) => TypeDenoter::Struct(Some(name.clone())),
                Some(_) => {
                    self.reports.error(
                        format!("identifier '{}' does not name a type", name),
                        Some(area),
                    );
                    TypeDenoter::Unknown
                }
                None => {
                    self.reports.error_with_code(
                        format!("undeclared identifier '{}'", name),
                        Some(area),
                        codes::ERR_UNDECLARED_IDENTIFIER,
                    );
                    TypeDenoter::Unknown
                }
            },
            TypeDenoter::Struct(Some(name)) => {
                if self.structs.contains_key(name)
                    || matches!(self.symbols.fetch(name), Some(Symbol::Struct))
                {
                    TypeDenoter::Struct(Some(name.clone()))
                } else {
                    self.reports.error_with_code(
                        format!("undeclared structure '{}'", name),
                        Some(area),
                        codes::ERR_UNDECLARED_IDENTIFIER,
                    );
                    TypeDenoter::Unknown
                }
            }
            TypeDenoter::Array { base, dims } => TypeDenoter::Array {
                base: Box::new(self.resolve_denoter(base, area)),
                dims: dims.clone(),
            },
            other => other.clone(),
        }
    }

    /// Computes and stores the type of an expression. Failed subtrees
    /// receive the Unknown sentinel so downstream diagnostics stay quiet.
    pub(crate) fn type_of_expr(&mut self, expr: &mut Expr) -> TypeDenoter {
        let area = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::Null => TypeDenoter::Unknown,

            ExprKind::List { first, next } => {
                let ty = self.type_of_expr(first);
                self.type_of_expr(next);
                ty
            }

            ExprKind::Literal { data_type, .. } => TypeDenoter::Base(*data_type),

            ExprKind::TypeName(denoter) => {
                let denoter = denoter.clone();
                self.resolve_denoter(&denoter, area)
            }

            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.type_of_expr(condition);
                let then_ty = self.type_of_expr(then_expr);
                let else_ty = self.type_of_expr(else_expr);
                self.common_denoter(&then_ty, &else_ty, area)
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let op = *op;
                let lhs_ty = self.type_of_expr(lhs);
                let rhs_ty = self.type_of_expr(rhs);
                let common = self.common_denoter(&lhs_ty, &rhs_ty, area);
                if op.is_comparison() {
                    bool_shaped(&common)
                } else {
                    common
                }
            }

            ExprKind::Unary { op, expr } => {
                let op = *op;
                let ty = self.type_of_expr(expr);
                if op == UnaryOp::LogicalNot {
                    bool_shaped(&ty)
                } else {
                    ty
                }
            }

            ExprKind::PostUnary { expr, .. } => self.type_of_expr(expr),

            ExprKind::Call(call) => self.analyze_function_call(call, area),

            ExprKind::Bracket(inner) => self.type_of_expr(inner),

            ExprKind::Suffix { expr, var_ident } => {
                let base = self.type_of_expr(expr);
                self.resolve_member_chain(base, var_ident)
            }

            ExprKind::ArrayAccess { expr, indices } => {
                let base = self.type_of_expr(expr);
                for index in indices.iter_mut() {
                    self.type_of_expr(index);
                }
                let count = indices.len();
                match base.peel_arrays(count) {
                    Some(ty) => ty,
                    None => {
                        if !base.is_unknown() {
                            self.reports.error(
                                format!("cannot index non-array type '{}'", base),
                                Some(area),
                            );
                        }
                        TypeDenoter::Unknown
                    }
                }
            }

            ExprKind::Cast { target, expr } => {
                let target = target.clone();
                let from = self.type_of_expr(expr);
                let to = self.resolve_denoter(&target, area);
                self.validate_type_cast(&from, &to, area);
                to
            }

            ExprKind::VarAccess {
                var_ident,
                assign_op,
                assign_expr,
            } => {
                let ty = self.analyze_var_ident(var_ident);
                if assign_op.is_some() {
                    if let Some(assign_expr) = assign_expr {
                        let value_ty = self.type_of_expr(assign_expr);
                        let value_area = assign_expr.span;
                        self.validate_type_cast(&value_ty, &ty, value_area);
                    }
                }
                ty
            }

            ExprKind::Initializer(exprs) => {
                for expr in exprs.iter_mut() {
                    self.type_of_expr(expr);
                }
                // The aggregate type is imposed by the declaration.
                TypeDenoter::Unknown
            }
        };

        expr.ty = Some(ty.clone());
        ty
    }

    /// Resolves a variable identifier: the first element against the
    /// symbol table, subsequent elements against the fetched type.
    pub(crate) fn analyze_var_ident(&mut self, ident: &mut VarIdent) -> TypeDenoter {
        for index in &mut ident.array_indices {
            self.type_of_expr(index);
        }

        let symbol = self.symbols.fetch(&ident.ident).cloned();
        match symbol {
            None => {
                let message = match self.call_stack.last() {
                    Some(call) => format!(
                        "undeclared identifier '{}' in call to '{}'",
                        ident.ident, call
                    ),
                    None => format!("undeclared identifier '{}'", ident.ident),
                };
                self.reports.error_with_code(
                    message,
                    Some(ident.span),
                    codes::ERR_UNDECLARED_IDENTIFIER,
                );
                TypeDenoter::Unknown
            }

            Some(Symbol::Variable { ty, semantic, .. }) => {
                ident.symbol = Some(SymbolRef {
                    kind: SymbolKind::Variable,
                    ty: Some(ty.clone()),
                });

                // Reading a position-semantic variable on the fragment
                // stage maps to gl_FragCoord.
                if self.target == ShaderTarget::Fragment
                    && semantic
                        .as_ref()
                        .is_some_and(|s| s.semantic == Semantic::Position)
                {
                    self.frag_coord_used = true;
                }

                let ty = match ty.peel_arrays(ident.array_indices.len()) {
                    Some(ty) => ty,
                    None => {
                        self.reports.error(
                            format!("too many array indices on '{}'", ident.ident),
                            Some(ident.span),
                        );
                        return TypeDenoter::Unknown;
                    }
                };

                match &mut ident.next {
                    Some(next) => self.resolve_member_chain(ty, next),
                    None => ty,
                }
            }

            Some(Symbol::Texture { texture_type, .. }) => {
                ident.symbol = Some(SymbolRef {
                    kind: SymbolKind::Texture,
                    ty: Some(TypeDenoter::Texture(texture_type)),
                });
                if ident.next.is_some() {
                    // Texture member accesses stay undecorated for the
                    // back-end.
                    TypeDenoter::Unknown
                } else {
                    TypeDenoter::Texture(texture_type)
                }
            }

            Some(Symbol::Sampler) => {
                ident.symbol = Some(SymbolRef {
                    kind: SymbolKind::Sampler,
                    ty: Some(TypeDenoter::Sampler),
                });
                TypeDenoter::Sampler
            }

            Some(Symbol::Struct) => {
                ident.symbol = Some(SymbolRef {
                    kind: SymbolKind::Struct,
                    ty: Some(TypeDenoter::Struct(Some(ident.ident.clone()))),
                });
                TypeDenoter::Struct(Some(ident.ident.clone()))
            }

            Some(Symbol::Alias { ty }) => {
                ident.symbol = Some(SymbolRef {
                    kind: SymbolKind::Alias,
                    ty: Some(ty.clone()),
                });
                ty
            }

            Some(Symbol::Functions(_)) => {
                self.reports.error(
                    format!("invalid reference to function '{}'", ident.ident),
                    Some(ident.span),
                );
                ident.symbol = Some(SymbolRef {
                    kind: SymbolKind::Function,
                    ty: None,
                });
                TypeDenoter::Unknown
            }
        }
    }

    /// Resolves member access / swizzles along a `.next` chain against a
    /// known base type.
    fn resolve_member_chain(&mut self, base: TypeDenoter, ident: &mut VarIdent) -> TypeDenoter {
        for index in &mut ident.array_indices {
            self.type_of_expr(index);
        }

        let member_ty = match &base {
            TypeDenoter::Unknown => TypeDenoter::Unknown,

            TypeDenoter::Struct(Some(name)) => match self.fetch_struct_member(name, &ident.ident) {
                Some(member) => {
                    ident.symbol = Some(SymbolRef {
                        kind: SymbolKind::Variable,
                        ty: Some(member.ty.clone()),
                    });
                    member.ty
                }
                None => {
                    self.reports.error_with_code(
                        format!(
                            "undeclared identifier '{}' in structure '{}'",
                            ident.ident, name
                        ),
                        Some(ident.span),
                        codes::ERR_UNDECLARED_IDENTIFIER,
                    );
                    TypeDenoter::Unknown
                }
            },

            TypeDenoter::Base(data_type) => match swizzle_type(*data_type, &ident.ident) {
                Some(ty) => TypeDenoter::Base(ty),
                None => {
                    self.reports.error(
                        format!("invalid subscript '{}'", ident.ident),
                        Some(ident.span),
                    );
                    TypeDenoter::Unknown
                }
            },

            // Texture and sampler members pass through undecorated.
            TypeDenoter::Texture(_) | TypeDenoter::Sampler => TypeDenoter::Unknown,

            other => {
                self.reports.error(
                    format!("type '{}' has no members", other),
                    Some(ident.span),
                );
                TypeDenoter::Unknown
            }
        };

        let member_ty = match member_ty.peel_arrays(ident.array_indices.len()) {
            Some(ty) => ty,
            None => {
                if !member_ty.is_unknown() {
                    self.reports.error(
                        format!("too many array indices on '{}'", ident.ident),
                        Some(ident.span),
                    );
                }
                TypeDenoter::Unknown
            }
        };

        match &mut ident.next {
            Some(next) => self.resolve_member_chain(member_ty, next),
            None => member_ty,
        }
    }

    /// Looks a member up in a struct, walking the single-inheritance
    /// chain.
    fn fetch_struct_member(
        &self,
        struct_name: &str,
        member: &str,
    ) -> Option<crate::analyzer::MemberInfo> {
        let mut current = Some(struct_name.to_string());
        let mut steps = 0;
        while let Some(name) = current {
            let info = self.structs.get(&name)?;
            if let Some(found) = info.members.iter().find(|m| m.ident == member) {
                return Some(found.clone());
            }
            steps += 1;
            if steps > 64 {
                return None;
            }
            current = info.base.clone();
        }
        None
    }

    // ----- Calls -----

    pub(crate) fn analyze_function_call(
        &mut self,
        call: &mut FunctionCall,
        area: SourceArea,
    ) -> TypeDenoter {
        let stack_name = call.name.as_ref().map(|n| n.full_name());
        if let Some(name) = stack_name.clone() {
            self.call_stack.push(name);
        }

        // Arguments first, so their diagnostics carry the call context.
        let arg_types: Vec<TypeDenoter> = call
            .args
            .iter_mut()
            .map(|arg| self.type_of_expr(arg))
            .collect();

        let result = if let Some(ctor) = &call.type_ctor {
            let ctor = ctor.clone();
            self.resolve_denoter(&ctor, area)
        } else if call
            .name
            .as_ref()
            .is_some_and(|name| name.next.is_some())
        {
            self.analyze_member_call(call, &arg_types, area)
        } else if call.name.is_some() {
            self.analyze_plain_call(call, &arg_types, area)
        } else {
            TypeDenoter::Unknown
        };

        if stack_name.is_some() {
            self.call_stack.pop();
        }
        result
    }

    /// A call on a member chain: texture-object methods are validated
    /// against the texture intrinsics; anything else passes through
    /// undecorated.
    fn analyze_member_call(
        &mut self,
        call: &mut FunctionCall,
        arg_types: &[TypeDenoter],
        area: SourceArea,
    ) -> TypeDenoter {
        let name = call.name.as_mut().expect("member call has a callee");
        let method = name.last().ident.clone();
        let object_symbol = self.symbols.fetch(&name.ident).cloned();

        // Decorate the object identifier.
        let object_is_texture = matches!(object_symbol, Some(Symbol::Texture { .. }));
        let color_type = match &object_symbol {
            Some(Symbol::Texture { color_type, .. }) => *color_type,
            _ => None,
        };
        if let Some(Symbol::Texture { texture_type, .. }) = object_symbol {
            name.symbol = Some(SymbolRef {
                kind: SymbolKind::Texture,
                ty: Some(TypeDenoter::Texture(texture_type)),
            });
        } else if object_symbol.is_none() {
            self.reports.error_with_code(
                format!("undeclared identifier '{}'", name.ident),
                Some(name.span),
                codes::ERR_UNDECLARED_IDENTIFIER,
            );
            return TypeDenoter::Unknown;
        }

        match lookup_intrinsic(&method) {
            Some(entry) => {
                if object_is_texture && !entry.intrinsic.is_texture_method() {
                    self.reports.error(
                        format!("invalid intrinsic '{}' for a texture object", method),
                        Some(area),
                    );
                    return TypeDenoter::Unknown;
                }
                if !object_is_texture && entry.intrinsic.is_texture_method() {
                    self.reports.error(
                        format!("intrinsic '{}' requires a texture object", method),
                        Some(area),
                    );
                    return TypeDenoter::Unknown;
                }
                if !entry.intrinsic.is_texture_method() {
                    // A non-texture intrinsic spelled as a member call.
                    self.reports.error(
                        format!("intrinsic '{}' cannot be called as a member", method),
                        Some(area),
                    );
                    return TypeDenoter::Unknown;
                }

                self.check_shader_model(&method, entry.min_shader_model, area);
                let intrinsic = refine_by_argument_count(entry.intrinsic, arg_types.len());
                call.intrinsic = Some(intrinsic);
                texture_method_return_type(intrinsic, color_type)
            }
            // Unresolved method names pass through to the back-end.
            None => TypeDenoter::Unknown,
        }
    }

    fn analyze_plain_call(
        &mut self,
        call: &mut FunctionCall,
        arg_types: &[TypeDenoter],
        area: SourceArea,
    ) -> TypeDenoter {
        let name = call.name.as_mut().expect("plain call has a callee");

        if let Some(entry) = lookup_intrinsic(&name.ident) {
            if entry.intrinsic.is_texture_method() {
                self.reports.error(
                    format!("intrinsic '{}' requires a texture object", name.ident),
                    Some(area),
                );
                return TypeDenoter::Unknown;
            }
            self.check_shader_model(&name.ident.clone(), entry.min_shader_model, area);
            let intrinsic = refine_by_argument_count(entry.intrinsic, arg_types.len());
            call.intrinsic = Some(intrinsic);
            return intrinsic_return_type(intrinsic, arg_types);
        }

        let Some(group) = self.symbols.fetch_functions(&name.ident).map(<[_]>::to_vec) else {
            let message = if self.symbols.fetch(&name.ident).is_some() {
                format!("'{}' is not a function", name.ident)
            } else if self.call_stack.len() > 1 {
                // The innermost entry is this call itself.
                let outer = &self.call_stack[self.call_stack.len() - 2];
                format!(
                    "undeclared identifier '{}' in call to '{}'",
                    name.ident, outer
                )
            } else {
                format!("undeclared identifier '{}'", name.ident)
            };
            self.reports.error_with_code(
                message,
                Some(name.span),
                codes::ERR_UNDECLARED_IDENTIFIER,
            );
            return TypeDenoter::Unknown;
        };

        match resolve_overload(&group, arg_types) {
            Ok(index) => {
                call.resolved_overload = Some(index);
                let return_type = group[index].return_type.clone();
                name.symbol = Some(SymbolRef {
                    kind: SymbolKind::Function,
                    ty: Some(return_type.clone()),
                });
                return_type
            }
            Err(OverloadError::NoMatch) => {
                self.reports.error(
                    format!("no matching overload for call to '{}'", name.ident),
                    Some(area),
                );
                TypeDenoter::Unknown
            }
            Err(OverloadError::Ambiguous) => {
                self.reports.error_with_code(
                    format!("ambiguous call to overloaded function '{}'", name.ident),
                    Some(area),
                    codes::ERR_AMBIGUOUS_OVERLOAD,
                );
                TypeDenoter::Unknown
            }
        }
    }

    fn check_shader_model(
        &mut self,
        name: &str,
        minimum: xshade_common::ShaderModel,
        area: SourceArea,
    ) {
        if self.shader_model < minimum {
            self.reports.warning(
                format!(
                    "intrinsic '{}' requires shader model {}, but only {} is specified",
                    name, minimum, self.shader_model
                ),
                Some(area),
            );
        }
    }

    // ----- Implicit casts -----

    /// Accepts identity, numeric widening, shape truncation (with a
    /// warning), and struct-to-struct by exact match.
    pub(crate) fn validate_type_cast(
        &mut self,
        from: &TypeDenoter,
        to: &TypeDenoter,
        area: SourceArea,
    ) {
        if from.is_unknown() || to.is_unknown() || from == to {
            return;
        }

        match (from, to) {
            (TypeDenoter::Base(from_ty), TypeDenoter::Base(to_ty)) => {
                if (*from_ty == DataType::String) != (*to_ty == DataType::String) {
                    self.reports.error_with_code(
                        format!("cannot implicitly convert from '{}' to '{}'", from, to),
                        Some(area),
                        codes::ERR_INVALID_CAST,
                    );
                    return;
                }
                let from_count = from_ty.component_count();
                let to_count = to_ty.component_count();
                if from_ty.is_scalar() || from_count == to_count {
                    return;
                }
                if from_count > to_count {
                    self.reports.warning(
                        format!("implicit truncation of '{}' to '{}'", from, to),
                        Some(area),
                    );
                } else {
                    self.reports.error_with_code(
                        format!("cannot implicitly convert from '{}' to '{}'", from, to),
                        Some(area),
                        codes::ERR_INVALID_CAST,
                    );
                }
            }

            (TypeDenoter::Struct(a), TypeDenoter::Struct(b)) => {
                if a != b {
                    self.reports.error_with_code(
                        format!("cannot cast from '{}' to '{}'", from, to),
                        Some(area),
                        codes::ERR_INVALID_CAST,
                    );
                }
            }

            (TypeDenoter::Void, _) | (_, TypeDenoter::Void) => {
                self.reports.error(
                    "cannot use a value of type 'void'",
                    Some(area),
                );
            }

            _ => {
                self.reports.error_with_code(
                    format!("cannot cast from '{}' to '{}'", from, to),
                    Some(area),
                    codes::ERR_INVALID_CAST,
                );
            }
        }
    }

    /// Common type of two operands under the usual arithmetic
    /// conversions, reporting incompatibilities.
    fn common_denoter(
        &mut self,
        lhs: &TypeDenoter,
        rhs: &TypeDenoter,
        area: SourceArea,
    ) -> TypeDenoter {
        if lhs.is_unknown() || rhs.is_unknown() {
            return TypeDenoter::Unknown;
        }
        if lhs == rhs {
            return lhs.clone();
        }
        match (lhs, rhs) {
            (TypeDenoter::Base(a), TypeDenoter::Base(b)) => match common_data_type(*a, *b) {
                Some((ty, truncated)) => {
                    if truncated {
                        self.reports.warning(
                            format!("implicit truncation between '{}' and '{}'", lhs, rhs),
                            Some(area),
                        );
                    }
                    TypeDenoter::Base(ty)
                }
                None => {
                    self.reports.error_with_code(
                        format!("incompatible operand types '{}' and '{}'", lhs, rhs),
                        Some(area),
                        codes::ERR_INVALID_CAST,
                    );
                    TypeDenoter::Unknown
                }
            },
            _ => {
                self.reports.error_with_code(
                    format!("incompatible operand types '{}' and '{}'", lhs, rhs),
                    Some(area),
                    codes::ERR_INVALID_CAST,
                );
                TypeDenoter::Unknown
            }
        }
    }
}

/// Castability check without diagnostics, for overload resolution.
fn is_implicitly_castable(from: &TypeDenoter, to: &TypeDenoter) -> bool {
    if from.is_unknown() || to.is_unknown() || from == to {
        return true;
    }
    match (from, to) {
        (TypeDenoter::Base(a), TypeDenoter::Base(b)) => {
            (*a == DataType::String) == (*b == DataType::String)
        }
        (TypeDenoter::Struct(a), TypeDenoter::Struct(b)) => a == b,
        _ => false,
    }
}

/// Deterministic overload resolution: exact matches first, implicit
/// casts second.
fn resolve_overload(
    group: &[FunctionSig],
    arg_types: &[TypeDenoter],
) -> Result<usize, OverloadError> {
    let arity_matches: Vec<usize> = group
        .iter()
        .enumerate()
        .filter(|(_, sig)| sig.params.len() == arg_types.len())
        .map(|(index, _)| index)
        .collect();
    if arity_matches.is_empty() {
        return Err(OverloadError::NoMatch);
    }

    let exact: Vec<usize> = arity_matches
        .iter()
        .copied()
        .filter(|&index| {
            group[index]
                .params
                .iter()
                .zip(arg_types)
                .all(|(param, arg)| arg.is_unknown() || param == arg)
        })
        .collect();
    if let [index] = exact.as_slice() {
        return Ok(*index);
    }
    if exact.len() > 1 {
        // Identical signatures; the first declaration wins so resolution
        // stays deterministic.
        return Ok(exact[0]);
    }

    let castable: Vec<usize> = arity_matches
        .iter()
        .copied()
        .filter(|&index| {
            group[index]
                .params
                .iter()
                .zip(arg_types)
                .all(|(param, arg)| is_implicitly_castable(arg, param))
        })
        .collect();
    match castable.as_slice() {
        [] => Err(OverloadError::NoMatch),
        [index] => Ok(*index),
        _ => Err(OverloadError::Ambiguous),
    }
}

/// Boolean-shaped version of a type, for comparisons.
fn bool_shaped(ty: &TypeDenoter) -> TypeDenoter {
    match ty {
        TypeDenoter::Base(data_type) => match data_type {
            DataType::Vector(_, n) => TypeDenoter::Base(DataType::Vector(ScalarType::Bool, *n)),
            DataType::Matrix(_, m, n) => {
                TypeDenoter::Base(DataType::Matrix(ScalarType::Bool, *m, *n))
            }
            _ => TypeDenoter::Base(DataType::Scalar(ScalarType::Bool)),
        },
        TypeDenoter::Unknown => TypeDenoter::Unknown,
        _ => TypeDenoter::Base(DataType::Scalar(ScalarType::Bool)),
    }
}

/// Type of a vector swizzle, or None when the pattern is invalid for the
/// accessed type.
fn swizzle_type(data_type: DataType, pattern: &str) -> Option<DataType> {
    let (scalar, dim) = match data_type {
        DataType::Scalar(s) => (s, 1u8),
        DataType::Vector(s, n) => (s, n),
        _ => return None,
    };
    if pattern.is_empty() || pattern.len() > 4 {
        return None;
    }

    let position_set = "xyzw";
    let color_set = "rgba";
    let set = if pattern.chars().all(|c| position_set.contains(c)) {
        position_set
    } else if pattern.chars().all(|c| color_set.contains(c)) {
        color_set
    } else {
        return None;
    };

    for c in pattern.chars() {
        let index = set.find(c).unwrap() as u8;
        if index >= dim {
            return None;
        }
    }

    Some(if pattern.len() == 1 {
        DataType::Scalar(scalar)
    } else {
        DataType::Vector(scalar, pattern.len() as u8)
    })
}

/// Return type of a texture-object method.
fn texture_method_return_type(
    intrinsic: Intrinsic,
    color_type: Option<DataType>,
) -> TypeDenoter {
    use Intrinsic as I;
    match intrinsic {
        I::TextureGetDimensions => TypeDenoter::Void,
        I::TextureSampleCmp3 | I::TextureSampleCmp4 | I::TextureSampleCmp5
        | I::TextureSampleCmp6 => TypeDenoter::Base(DataType::Scalar(ScalarType::Float)),
        _ => TypeDenoter::Base(color_type.unwrap_or(DataType::Vector(ScalarType::Float, 4))),
    }
}

/// Return type of a non-member intrinsic, from its argument types.
fn intrinsic_return_type(intrinsic: Intrinsic, arg_types: &[TypeDenoter]) -> TypeDenoter {
    use Intrinsic as I;

    let arg0 = arg_types.first().cloned().unwrap_or(TypeDenoter::Unknown);
    let arg0_data = match &arg0 {
        TypeDenoter::Base(data_type) => Some(*data_type),
        _ => None,
    };
    let scalar_of_arg0 = arg0_data
        .and_then(|d| d.scalar_type())
        .unwrap_or(ScalarType::Float);
    let float4 = TypeDenoter::Base(DataType::Vector(ScalarType::Float, 4));

    match intrinsic {
        I::Dot | I::Distance | I::Length | I::Determinant => {
            TypeDenoter::Base(DataType::Scalar(scalar_of_arg0))
        }

        I::All | I::Any => TypeDenoter::Base(DataType::Scalar(ScalarType::Bool)),
        I::IsFinite | I::IsInf | I::IsNan => bool_shaped(&arg0),

        I::Clip
        | I::SinCos
        | I::GroupMemoryBarrier
        | I::GroupMemoryBarrierWithGroupSync
        | I::InterlockedAdd
        | I::InterlockedAnd
        | I::InterlockedCompareExchange
        | I::InterlockedCompareStore
        | I::InterlockedExchange
        | I::InterlockedMax
        | I::InterlockedMin
        | I::InterlockedOr
        | I::InterlockedXor => TypeDenoter::Void,

        I::Mul => mul_return_type(arg_types),

        I::Transpose => match arg0_data {
            Some(DataType::Matrix(s, m, n)) => TypeDenoter::Base(DataType::Matrix(s, n, m)),
            _ => arg0,
        },

        I::AsUint1 | I::AsUint3 | I::F32ToF16 | I::CountBits | I::FirstBitHigh
        | I::FirstBitLow => shaped_as(&arg0, ScalarType::UInt),
        I::AsInt => shaped_as(&arg0, ScalarType::Int),
        I::AsFloat | I::F16ToF32 => shaped_as(&arg0, ScalarType::Float),
        I::AsDouble => TypeDenoter::Base(DataType::Scalar(ScalarType::Double)),

        I::Lit => float4.clone(),
        I::Noise => TypeDenoter::Base(DataType::Scalar(ScalarType::Float)),

        I::Tex1D2 | I::Tex1D4 | I::Tex1DBias | I::Tex1DGrad | I::Tex1DLod | I::Tex1DProj
        | I::Tex2D2 | I::Tex2D4 | I::Tex2DBias | I::Tex2DGrad | I::Tex2DLod | I::Tex2DProj
        | I::Tex3D2 | I::Tex3D4 | I::Tex3DBias | I::Tex3DGrad | I::Tex3DLod | I::Tex3DProj
        | I::TexCube2 | I::TexCube4 | I::TexCubeBias | I::TexCubeGrad | I::TexCubeLod
        | I::TexCubeProj => float4,

        // lerp, clamp, and friends follow their first operand.
        _ => arg0,
    }
}

/// `mul` typing: scalars broadcast, vector*matrix and matrix*vector
/// contract, matrix*matrix chains.
fn mul_return_type(arg_types: &[TypeDenoter]) -> TypeDenoter {
    let (Some(TypeDenoter::Base(a)), Some(TypeDenoter::Base(b))) =
        (arg_types.first(), arg_types.get(1))
    else {
        return arg_types.first().cloned().unwrap_or(TypeDenoter::Unknown);
    };
    let scalar = a
        .scalar_type()
        .unwrap_or(ScalarType::Float)
        .widened(b.scalar_type().unwrap_or(ScalarType::Float));
    match (a, b) {
        (DataType::Scalar(_), other) | (other, DataType::Scalar(_)) => {
            TypeDenoter::Base(*other)
        }
        (DataType::Vector(_, _), DataType::Matrix(_, _, n)) => {
            TypeDenoter::Base(DataType::Vector(scalar, *n))
        }
        (DataType::Matrix(_, m, _), DataType::Vector(_, _)) => {
            TypeDenoter::Base(DataType::Vector(scalar, *m))
        }
        (DataType::Matrix(_, m, _), DataType::Matrix(_, _, n)) => {
            TypeDenoter::Base(DataType::Matrix(scalar, *m, *n))
        }
        (a, _) => TypeDenoter::Base(*a),
    }
}

fn shaped_as(ty: &TypeDenoter, scalar: ScalarType) -> TypeDenoter {
    match ty {
        TypeDenoter::Base(DataType::Scalar(_)) => TypeDenoter::Base(DataType::Scalar(scalar)),
        TypeDenoter::Base(DataType::Vector(_, n)) => {
            TypeDenoter::Base(DataType::Vector(scalar, *n))
        }
        TypeDenoter::Base(DataType::Matrix(_, m, n)) => {
            TypeDenoter::Base(DataType::Matrix(scalar, *m, *n))
        }
        _ => TypeDenoter::Base(DataType::Scalar(scalar)),
    }
}
