use genco::prelude::*;
use wrapgen_go::{block, decls, lines};
use wrapgen_reflect::{FuncDecl, Universe};

use crate::call::Callable;
use crate::context::FileContext;

/// Adapter exposing a free function to the interpreter.
pub struct FunctionAdapter<'u> {
    decl: &'u FuncDecl,
    callable: Callable<'u>,
}

impl<'u> FunctionAdapter<'u> {
    pub fn new(universe: &'u Universe, decl: &'u FuncDecl, names: &[String]) -> Self {
        let callable = Callable::new(universe, decl.name.clone(), &decl.signature, names);
        Self { decl, callable }
    }

    /// `<Func>Function`
    pub fn type_name(&self) -> String {
        format!("{}Function", self.decl.name)
    }

    pub fn file_name(&self) -> String {
        format!("{}_func.go", self.decl.name.to_lowercase())
    }

    pub fn callable(&self) -> &Callable<'u> {
        &self.callable
    }

    pub fn generate(&self, cx: &mut FileContext<'_>) -> Tokens<Go> {
        cx.use_data();
        let name = self.type_name();
        let name = name.as_str();
        let ctor = format!("New{name}");
        let source = cx.source();
        let call = self
            .callable
            .call_body(cx, &format!("{source}.{}", self.decl.name));
        let params = self.callable.params_body(cx);
        let variables = self.callable.variables_body(cx);
        let return_type = self.callable.return_type(cx);
        let prefix = cx.config().name_prefix_for(&self.decl.package);
        let full_name = quoted(format!("{prefix}\\{}", self.decl.name));

        decls([
            quote!(func $(ctor.as_str())() data.FuncStmt $(block(quote!(return &$name{})))),
            quote!(type $name struct{}),
            quote!(func (h *$name) Call(ctx data.Context) (data.GetValue, data.Control) $(block(call))),
            lines([
                quote!(func (h *$name) GetName() string { return $full_name }),
                quote!(func (h *$name) GetModifier() data.Modifier { return data.ModifierPublic }),
                quote!(func (h *$name) GetIsStatic() bool { return false }),
            ]),
            quote!(func (h *$name) GetParams() []data.GetValue $(block(params))),
            quote!(func (h *$name) GetVariables() []data.Variable $(block(variables))),
            quote!(func (h *$name) GetReturnType() data.Types { return $return_type }),
        ])
    }
}
