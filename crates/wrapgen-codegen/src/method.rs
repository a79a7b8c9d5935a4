use genco::prelude::*;
use wrapgen_go::naming::lower_first;
use wrapgen_go::{block, decls, lines, GoType};
use wrapgen_reflect::{Method, Universe};

use crate::call::Callable;
use crate::context::FileContext;
use crate::convert::{throw_message, Exit};

/// `<Type>_<Method>Method`. The separator keeps `User.SetName` and
/// `UserSet.Name` apart.
pub fn adapter_name(class: &str, method: &str) -> String {
    format!("{class}_{method}Method")
}

/// Adapter exposing one method of a wrapped type to the interpreter.
pub struct MethodAdapter<'u> {
    class: &'u str,
    method: &'u Method,
    callable: Callable<'u>,
}

impl<'u> MethodAdapter<'u> {
    pub fn new(universe: &'u Universe, class: &'u str, method: &'u Method, names: &[String]) -> Self {
        let callable = Callable::new(
            universe,
            format!("{class}.{}", method.name),
            &method.signature,
            names,
        );
        Self {
            class,
            method,
            callable,
        }
    }

    pub fn type_name(&self) -> String {
        adapter_name(self.class, &self.method.name)
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_method.go",
            self.class.to_lowercase(),
            self.method.name.to_lowercase()
        )
    }

    pub fn callable(&self) -> &Callable<'u> {
        &self.callable
    }

    /// Declarations of the adapter type holding a `source` of type `source`.
    pub fn generate(&self, cx: &mut FileContext<'_>, source: &GoType) -> Tokens<Go> {
        cx.use_data();
        let name = self.type_name();
        let name = name.as_str();
        let no_source = throw_message(
            cx,
            Exit::Call,
            &format!("{}: called without a source value", self.callable.label()),
        );
        let call = self
            .callable
            .call_body(cx, &format!("h.source.{}", self.method.name));
        let params = self.callable.params_body(cx);
        let variables = self.callable.variables_body(cx);
        let return_type = self.callable.return_type(cx);
        let method_name = quoted(lower_first(&self.method.name));

        let call = decls([quote!(if h.source == nil $(block(no_source))), call]);
        decls([
            quote!(type $name struct $(block(quote!(source $(source.to_string()))))),
            quote!(func (h *$name) Call(ctx data.Context) (data.GetValue, data.Control) $(block(call))),
            lines([
                quote!(func (h *$name) GetName() string { return $method_name }),
                quote!(func (h *$name) GetModifier() data.Modifier { return data.ModifierPublic }),
                quote!(func (h *$name) GetIsStatic() bool { return true }),
            ]),
            quote!(func (h *$name) GetParams() []data.GetValue $(block(params))),
            quote!(func (h *$name) GetVariables() []data.Variable $(block(variables))),
            quote!(func (h *$name) GetReturnType() data.Types { return $return_type }),
        ])
    }
}
