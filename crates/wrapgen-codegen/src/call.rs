//! The `Call` entry point and parameter metadata shared by method and function
//! adapters.

use genco::prelude::*;
use wrapgen_go::{block, comment, decls, lines};
use wrapgen_reflect::{Signature, Ty, TypeExpr, Universe};

use crate::context::FileContext;
use crate::convert::{declare_and_extract, throw, throw_message, wrap, Exit, HostCtx, Site};

/// A declared parameter of a wrapped callable.
#[derive(Debug, Clone)]
pub struct Param<'u> {
    pub name: String,
    pub ty: Ty<'u>,
    /// Position among the interpreter arguments. `None` for a
    /// `context.Context`, which is taken from the calling context.
    pub slot: Option<usize>,
    /// The trailing `...T` parameter.
    pub variadic: bool,
}

/// A function or method signature as seen from the interpreter.
#[derive(Debug, Clone)]
pub struct Callable<'u> {
    label: String,
    params: Vec<Param<'u>>,
    values: Vec<Ty<'u>>,
    returns_error: bool,
}

impl<'u> Callable<'u> {
    /// `label` prefixes the errors thrown by the generated code.
    pub fn new(
        universe: &'u Universe,
        label: impl Into<String>,
        signature: &'u Signature,
        names: &[String],
    ) -> Self {
        let last = signature.params.len().saturating_sub(1);
        let mut next_slot = 0;
        let params = signature
            .params
            .iter()
            .enumerate()
            .map(|(i, expr)| {
                let ty = universe.ty(expr);
                let slot = (!ty.is_context()).then(|| {
                    next_slot += 1;
                    next_slot - 1
                });
                Param {
                    name: names
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("param{i}")),
                    ty,
                    slot,
                    variadic: signature.variadic && i == last,
                }
            })
            .collect();

        let (values, returns_error) = match signature.results.split_last() {
            Some((TypeExpr::Error, rest)) => (rest, true),
            _ => (signature.results.as_slice(), false),
        };

        Self {
            label: label.into(),
            params,
            values: values.iter().map(|expr| universe.ty(expr)).collect(),
            returns_error,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn params(&self) -> &[Param<'u>] {
        &self.params
    }

    /// Parameters read from interpreter arguments, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &Param<'u>)> {
        self.params.iter().filter_map(|p| p.slot.map(|slot| (slot, p)))
    }

    /// Results other than a trailing error.
    pub fn values(&self) -> &[Ty<'u>] {
        &self.values
    }

    pub fn returns_error(&self) -> bool {
        self.returns_error
    }

    pub fn variadic(&self) -> Option<&Param<'u>> {
        self.params.iter().find(|p| p.variadic)
    }

    /// Body of `Call(ctx data.Context) (data.GetValue, data.Control)`
    /// invoking `target`, e.g. `h.source.SetName` or `demosrc.Open`.
    pub fn call_body(&self, cx: &mut FileContext<'_>, target: &str) -> Tokens<Go> {
        cx.use_data();
        let mut steps: Vec<Tokens<Go>> = Vec::new();
        let mut args = Vec::with_capacity(self.params.len());

        for (i, param) in self.params.iter().enumerate() {
            let arg = format!("arg{i}");
            let Some(slot) = param.slot else {
                args.push("ctx.GoContext()".to_string());
                continue;
            };
            let value = format!("a{slot}");
            let fetch = if param.variadic {
                quote!($(value.as_str()), _ := ctx.GetIndexValue($(slot.to_string())))
            } else {
                let missing = throw_message(
                    cx,
                    Exit::Call,
                    &format!("{}: missing argument at index {slot}", self.label),
                );
                lines([
                    quote!($(value.as_str()), ok := ctx.GetIndexValue($(slot.to_string()))),
                    quote!(if !ok $(block(missing))),
                ])
            };
            let site = Site::argument(&self.label, slot);
            let extract = declare_and_extract(cx, &site, param.ty, &value, &arg);
            steps.push(lines([fetch, extract]));
            args.push(if param.variadic { format!("{arg}...") } else { arg });
        }

        let call = format!("{target}({})", args.join(", "));
        let rets: Vec<String> = (0..self.values.len()).map(|i| format!("ret{i}")).collect();
        let invoke = match (rets.is_empty(), self.returns_error) {
            (true, false) => quote!($(call.as_str())),
            (true, true) => {
                let thrown = throw(cx, Exit::Call, "err");
                quote!(if err := $(call.as_str()); err != nil $(block(thrown)))
            }
            (false, false) => quote!($(rets.join(", ")) := $(call.as_str())),
            (false, true) => {
                let thrown = throw(cx, Exit::Call, "err");
                lines([
                    quote!($(rets.join(", ")), err := $(call.as_str())),
                    quote!(if err != nil $(block(thrown))),
                ])
            }
        };

        let result = match self.values.as_slice() {
            [] => "nil".to_string(),
            [single] => wrap(cx, *single, "ret0", HostCtx::Call),
            many => {
                let items: Vec<String> = many
                    .iter()
                    .zip(&rets)
                    .map(|(ty, ret)| wrap(cx, *ty, ret, HostCtx::Call))
                    .collect();
                format!("data.NewArrayValue([]data.Value{{{}}})", items.join(", "))
            }
        };

        let finish = lines([invoke, quote!(return $result, nil)]);
        decls(steps.into_iter().chain([finish]))
    }

    /// Statements returning the parameter descriptors.
    pub fn params_body(&self, cx: &mut FileContext<'_>) -> Tokens<Go> {
        cx.use_data();
        let mut entries: Vec<Tokens<Go>> = Vec::new();
        for (slot, param) in self.slots() {
            cx.use_node();
            let name = quoted(param.name.clone());
            if param.variadic {
                log::warn!(
                    "{}: parameter {} is variadic and is bound by value; use node.NewParametersReference if the callee must see changes",
                    self.label,
                    param.name
                );
                entries.push(lines([
                    quote!($(comment(["Variadic slot; switch to node.NewParametersReference to bind it by reference."]))),
                    quote!(node.NewParameters(nil, $name, $(slot.to_string()), nil, nil),),
                ]));
            } else {
                entries.push(quote!(node.NewParameter(nil, $name, $(slot.to_string()), nil, nil),));
            }
        }
        quote!(return []data.GetValue$(block(lines(entries))))
    }

    /// Statements returning the variable descriptors.
    pub fn variables_body(&self, cx: &mut FileContext<'_>) -> Tokens<Go> {
        cx.use_data();
        let mut entries: Vec<Tokens<Go>> = Vec::new();
        for (slot, param) in self.slots() {
            cx.use_node();
            entries.push(quote!(node.NewVariable(nil, $(quoted(param.name.clone())), $(slot.to_string()), nil),));
        }
        quote!(return []data.Variable$(block(lines(entries))))
    }

    /// Expression for `GetReturnType`: void without values, dynamic otherwise.
    pub fn return_type(&self, cx: &mut FileContext<'_>) -> Tokens<Go> {
        cx.use_data();
        if self.values.is_empty() {
            quote!(data.NewBaseType("void"))
        } else {
            quote!(nil)
        }
    }
}
