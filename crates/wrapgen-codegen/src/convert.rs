//! Go statements moving values across the interpreter boundary.
//!
//! Extraction turns an interpreter `data.Value` held in a Go variable into a
//! native value of the expected type; wrapping goes the other way. Both are
//! driven by [`ConversionStrategy`], so parameters, results and properties
//! always agree on how a type crosses.

use genco::prelude::*;
use wrapgen_go::{arm, block, lines, switch, GoType};
use wrapgen_reflect::{proxy_target, BasicKind, Holding, Kind, TypeExpr, Ty};

use crate::context::FileContext;
use crate::strategy::{classify_conversion, ConversionStrategy};

/// How generated code leaves the enclosing Go function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// From `Call(ctx) (data.GetValue, data.Control)`.
    Call,
    /// From a method returning a bare `data.Control`.
    Control,
    /// From a callback closure with named results. Errors land in the result
    /// at the given index, or are dropped when the callback returns none.
    Callback(Option<usize>),
}

/// The `data.Context` available to generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCtx {
    /// The `ctx` argument of `Call`.
    Call,
    /// A detached context, used by property accessors.
    Detached,
}

impl HostCtx {
    pub fn expr(self, cx: &mut FileContext<'_>) -> &'static str {
        match self {
            HostCtx::Call => "ctx",
            HostCtx::Detached => {
                cx.use_runtime();
                "runtime.NewContextToDo()"
            }
        }
    }
}

/// Where an extraction is emitted and what it reports on a mismatch.
#[derive(Debug, Clone)]
pub struct Site {
    label: String,
    exit: Exit,
    host: HostCtx,
    mismatch: String,
}

impl Site {
    /// Argument slot `index` of the callable `label`.
    pub fn argument(label: &str, index: usize) -> Self {
        Self {
            label: label.to_string(),
            exit: Exit::Call,
            host: HostCtx::Call,
            mismatch: format!("{label}: unsupported argument type at index {index}"),
        }
    }

    /// A property assigned through `SetProperty`.
    pub fn property(class: &str, property: &str) -> Self {
        Self {
            label: class.to_string(),
            exit: Exit::Control,
            host: HostCtx::Detached,
            mismatch: format!("{class}: unsupported value for property {property}"),
        }
    }

    /// The value a script callback hands back to a closure built at this site.
    fn callback_result(&self, error_result: Option<usize>) -> Self {
        Self {
            label: self.label.clone(),
            exit: Exit::Callback(error_result),
            host: self.host,
            mismatch: format!("{}: unsupported callback result", self.label),
        }
    }
}

/// A `return` throwing the Go error expression `err`.
pub fn throw(cx: &mut FileContext<'_>, exit: Exit, err: impl FormatInto<Go>) -> Tokens<Go> {
    match exit {
        Exit::Call => {
            cx.use_data();
            quote!(return nil, data.NewErrorThrow(nil, $err))
        }
        Exit::Control => {
            cx.use_data();
            quote!(return data.NewErrorThrow(nil, $err))
        }
        Exit::Callback(Some(index)) => {
            lines([quote!($(format!("r{index}")) = $err), quote!(return)])
        }
        Exit::Callback(None) => quote!(return),
    }
}

/// A `return` throwing `errors.New(message)`.
pub fn throw_message(cx: &mut FileContext<'_>, exit: Exit, message: &str) -> Tokens<Go> {
    if exit == Exit::Callback(None) {
        return quote!(return);
    }
    cx.use_errors();
    throw(cx, exit, quote!(errors.New($(quoted(message.to_string())))))
}

fn mismatch(cx: &mut FileContext<'_>, site: &Site) -> Tokens<Go> {
    throw_message(cx, site.exit, &site.mismatch)
}

fn with_default(arms: &[Tokens<Go>], fail: &Tokens<Go>) -> Vec<Tokens<Go>> {
    let mut all = arms.to_vec();
    all.push(arm(quote!(default:), fail.clone()));
    all
}

/// Assigns the interpreter value held in `value` to the already declared Go
/// variable `dst` of type `ty`.
pub fn extract(cx: &mut FileContext<'_>, site: &Site, ty: Ty<'_>, value: &str, dst: &str) -> Tokens<Go> {
    extract_at(cx, site, ty, value, dst, 0)
}

/// Declares `dst` with the Go type of `ty` and extracts `value` into it.
pub fn declare_and_extract(
    cx: &mut FileContext<'_>,
    site: &Site,
    ty: Ty<'_>,
    value: &str,
    dst: &str,
) -> Tokens<Go> {
    let go_type = cx.go_type(ty.expr());
    let body = extract(cx, site, ty, value, dst);
    lines([quote!(var $dst $(go_type)), body])
}

fn extract_at(
    cx: &mut FileContext<'_>,
    site: &Site,
    ty: Ty<'_>,
    value: &str,
    dst: &str,
    depth: usize,
) -> Tokens<Go> {
    cx.use_data();
    let strategy = classify_conversion(ty, &cx.config().blacklist);
    match strategy {
        ConversionStrategy::PointerToStruct => {
            let elem = cx.go_type(ty.deref().expr());
            let arms = vec![
                quote!(case nil:),
                arm(quote!(case *$(elem.clone()):), quote!($dst = src)),
                arm(quote!(case $(elem):), quote!($dst = &src)),
            ];
            via_source(cx, site, value, arms, true)
        }
        ConversionStrategy::ValueStruct => {
            let elem = cx.go_type(ty.expr());
            let arms = vec![
                deref_arm(cx, site, &elem, dst),
                arm(quote!(case $(elem):), quote!($dst = src)),
            ];
            via_source(cx, site, value, arms, false)
        }
        ConversionStrategy::NamedInterface | ConversionStrategy::Channel => {
            let target = cx.go_type(ty.expr());
            let arms = vec![
                quote!(case nil:),
                deref_arm(cx, site, &target, dst),
                arm(quote!(case $(target):), quote!($dst = src)),
            ];
            via_source(cx, site, value, arms, true)
        }
        ConversionStrategy::BuiltinError => {
            let arms = vec![quote!(case nil:), arm(quote!(case error:), quote!($dst = src))];
            via_source(cx, site, value, arms, true)
        }
        ConversionStrategy::String | ConversionStrategy::NamedScalar(BasicKind::String) => {
            let target = cx.go_type(ty.expr());
            let read = match strategy {
                ConversionStrategy::NamedScalar(_) => format!("{target}(v.AsString())"),
                _ => "v.AsString()".to_string(),
            };
            let native = native_arm(cx, site, &target, dst);
            let fail = mismatch(cx, site);
            switch(
                quote!(v := $(value).(type)),
                [
                    arm(quote!(case *data.StringValue:), quote!($dst = $read)),
                    native,
                    arm(quote!(default:), fail),
                ],
            )
        }
        ConversionStrategy::Boolean | ConversionStrategy::NamedScalar(BasicKind::Bool) => {
            let target = cx.go_type(ty.expr()).to_string();
            let accessor = accessor_error(cx, site);
            let native = native_arm(cx, site, &GoType::ident(target.clone()), dst);
            let fail = mismatch(cx, site);
            let read = lines([
                quote!(b, err := v.AsBool()),
                quote!(if err != nil $(block(accessor))),
                quote!($dst = $(target.as_str())(b)),
            ]);
            switch(
                quote!(v := $(value).(type)),
                [arm(quote!(case *data.BoolValue:), read), native, arm(quote!(default:), fail)],
            )
        }
        ConversionStrategy::PrimitiveScalar(kind) | ConversionStrategy::NamedScalar(kind)
            if kind.is_float() =>
        {
            let target = cx.go_type(ty.expr()).to_string();
            let accessor = accessor_error(cx, site);
            let native = native_arm(cx, site, &GoType::ident(target.clone()), dst);
            let fail = mismatch(cx, site);
            let from_float = lines([
                quote!(f, err := v.AsFloat()),
                quote!(if err != nil $(block(accessor.clone()))),
                quote!($dst = $(target.as_str())(f)),
            ]);
            let from_int = lines([
                quote!(n, err := v.AsInt()),
                quote!(if err != nil $(block(accessor))),
                quote!($dst = $(target.as_str())(n)),
            ]);
            switch(
                quote!(v := $(value).(type)),
                [
                    arm(quote!(case *data.FloatValue:), from_float),
                    arm(quote!(case *data.IntValue:), from_int),
                    native,
                    arm(quote!(default:), fail),
                ],
            )
        }
        ConversionStrategy::PrimitiveScalar(_) | ConversionStrategy::NamedScalar(_) => {
            let target = cx.go_type(ty.expr()).to_string();
            let accessor = accessor_error(cx, site);
            let native = native_arm(cx, site, &GoType::ident(target.clone()), dst);
            let fail = mismatch(cx, site);
            let read = lines([
                quote!(n, err := v.AsInt()),
                quote!(if err != nil $(block(accessor))),
                quote!($dst = $(target.as_str())(n)),
            ]);
            switch(
                quote!(v := $(value).(type)),
                [arm(quote!(case *data.IntValue:), read), native, arm(quote!(default:), fail)],
            )
        }
        ConversionStrategy::SliceOf => extract_slice(cx, site, ty, value, dst, depth),
        ConversionStrategy::MapOf => extract_map(cx, site, ty, value, dst),
        ConversionStrategy::FunctionValue => match ty.signature() {
            Some(_) => extract_func(cx, site, ty, value, dst, depth),
            None => extract_opaque(cx, site, ty, value, dst),
        },
        ConversionStrategy::HostContext | ConversionStrategy::OpaqueAny => {
            extract_opaque(cx, site, ty, value, dst)
        }
    }
}

/// `case *T:` dereferencing the payload, refusing a nil pointer.
fn deref_arm(cx: &mut FileContext<'_>, site: &Site, target: &GoType, dst: &str) -> Tokens<Go> {
    let fail = mismatch(cx, site);
    arm(
        quote!(case *$(target.clone()):),
        lines([quote!(if src == nil $(block(fail))), quote!($dst = *src)]),
    )
}

/// Switches over the source value of a class, a source holder or an opaque
/// value, handing the payload `src` to `arms`.
fn via_source(
    cx: &mut FileContext<'_>,
    site: &Site,
    value: &str,
    arms: Vec<Tokens<Go>>,
    nilable: bool,
) -> Tokens<Go> {
    let fail = mismatch(cx, site);
    let from_class = lines([
        quote!(p, ok := v.Class.(data.GetSource)),
        quote!(if !ok $(block(fail.clone()))),
        switch(quote!(src := p.GetSource().(type)), with_default(&arms, &fail)),
    ]);
    let from_holder = switch(quote!(src := v.GetSource().(type)), with_default(&arms, &fail));
    let from_any = switch(quote!(src := v.Value.(type)), with_default(&arms, &fail));

    let mut outer = Vec::new();
    if nilable {
        outer.push(quote!(case nil:));
    }
    outer.push(arm(quote!(case *data.ClassValue:), from_class));
    outer.push(arm(quote!(case data.GetSource:), from_holder));
    outer.push(arm(quote!(case *data.AnyValue:), from_any));
    outer.push(arm(quote!(default:), fail));
    switch(quote!(v := $(value).(type)), outer)
}

/// Accepts an opaque value already holding the native type.
fn native_arm(cx: &mut FileContext<'_>, site: &Site, target: &GoType, dst: &str) -> Tokens<Go> {
    let fail = mismatch(cx, site);
    arm(
        quote!(case *data.AnyValue:),
        lines([
            quote!(native, ok := v.Value.($(target.to_string()))),
            quote!(if !ok $(block(fail))),
            quote!($dst = native),
        ]),
    )
}

fn accessor_error(cx: &mut FileContext<'_>, site: &Site) -> Tokens<Go> {
    throw(cx, site.exit, "err")
}

fn extract_slice(
    cx: &mut FileContext<'_>,
    site: &Site,
    ty: Ty<'_>,
    value: &str,
    dst: &str,
    depth: usize,
) -> Tokens<Go> {
    let Some(elem) = ty.elem() else {
        return extract_opaque(cx, site, ty, value, dst);
    };
    let target = cx.go_type(ty.expr());
    let elem_type = cx.go_type(elem.expr());
    let element = format!("e{depth}");
    let item = format!("item{depth}");
    let each = extract_at(cx, site, elem, &element, &item, depth + 1);
    let native = native_arm(cx, site, &target, dst);
    let fail = mismatch(cx, site);
    let body = lines([
        quote!(var $(item.as_str()) $(elem_type)),
        each,
        quote!($dst = append($dst, $(item.as_str()))),
    ]);
    let copy = lines([
        quote!($dst = make($(target.to_string()), 0, len(v.Value))),
        quote!(for _, $(element.as_str()) := range v.Value $(block(body))),
    ]);
    switch(
        quote!(v := $(value).(type)),
        [
            quote!(case nil:),
            arm(quote!(case *data.ArrayValue:), copy),
            native,
            arm(quote!(default:), fail),
        ],
    )
}

fn extract_map(cx: &mut FileContext<'_>, site: &Site, ty: Ty<'_>, value: &str, dst: &str) -> Tokens<Go> {
    let (Some(key), Some(elem)) = (ty.key(), ty.elem()) else {
        return extract_opaque(cx, site, ty, value, dst);
    };
    let target = cx.go_type(ty.expr()).to_string();
    let key_type = cx.go_type(key.expr()).to_string();
    let elem_type = cx.go_type(elem.expr()).to_string();
    let generic = target == "map[any]any";
    let fail = mismatch(cx, site);

    let mut inner = vec![arm(quote!(case $(target.as_str()):), quote!($dst = m))];
    if !generic {
        let each = lines([
            quote!(k, ok := mk.($(key_type.as_str()))),
            quote!(if !ok $(block(fail.clone()))),
            quote!(e, ok := mv.($(elem_type.as_str()))),
            quote!(if !ok $(block(fail.clone()))),
            quote!($(dst)[k] = e),
        ]);
        let convert = lines([
            quote!($dst = make($(target.as_str()), len(m))),
            quote!(for mk, mv := range m $(block(each))),
        ]);
        inner.push(arm(quote!(case map[any]any:), convert));
    }
    inner.push(arm(quote!(default:), fail.clone()));

    switch(
        quote!(v := $(value).(type)),
        [
            quote!(case nil:),
            arm(quote!(case *data.AnyValue:), switch(quote!(m := v.Value.(type)), inner)),
            arm(quote!(default:), fail),
        ],
    )
}

/// Rebuilds a Go function that calls back into an interpreter callable.
///
/// Arguments are bound to the callable's declared variables. What the script
/// returns is converted back into the closure's results: one value directly,
/// several from an array. A thrown error fills a trailing `error` result.
fn extract_func(
    cx: &mut FileContext<'_>,
    site: &Site,
    ty: Ty<'_>,
    value: &str,
    dst: &str,
    depth: usize,
) -> Tokens<Go> {
    let Some(signature) = ty.signature() else {
        return extract_opaque(cx, site, ty, value, dst);
    };
    let target = cx.go_type(ty.expr()).to_string();
    let host = site.host.expr(cx);

    let mut params = Vec::with_capacity(signature.params.len());
    let mut bindings = Vec::with_capacity(signature.params.len());
    let last = signature.params.len().saturating_sub(1);
    for (i, param) in signature.params.iter().enumerate() {
        let name = format!("p{i}");
        let spelled = match param {
            TypeExpr::Slice { elem } if signature.variadic && i == last => {
                format!("...{}", cx.go_type(elem))
            }
            _ => cx.go_type(param).to_string(),
        };
        params.push(format!("{name} {spelled}"));
        let wrapped = wrap_plain(cx, ty.sibling(param), &name);
        let set = quote!(fnCtx.SetVariableValue(vars[$(i.to_string())], $wrapped));
        bindings.push(quote!(if len(vars) > $(i.to_string()) $(block(set))));
    }

    let results: Vec<String> = signature
        .results
        .iter()
        .enumerate()
        .map(|(i, result)| format!("r{i} {}", cx.go_type(result)))
        .collect();
    let (values, error_result) = match signature.results.split_last() {
        Some((TypeExpr::Error, rest)) => (rest, Some(rest.len())),
        _ => (signature.results.as_slice(), None),
    };
    let header = match results.as_slice() {
        [] => format!("func({})", params.join(", ")),
        _ => format!("func({}) ({})", params.join(", "), results.join(", ")),
    };

    let mut body = vec![quote!(fnCtx := $(host).CreateBaseContext())];
    if !bindings.is_empty() {
        body.push(quote!(vars := fnv.Value.GetVariables()));
        body.extend(bindings);
    }
    let call = match (values.is_empty(), error_result.is_some()) {
        (true, false) => "fnv.Call(fnCtx)",
        (true, true) => "_, acl := fnv.Call(fnCtx)",
        (false, false) => "ret, _ := fnv.Call(fnCtx)",
        (false, true) => "ret, acl := fnv.Call(fnCtx)",
    };
    body.push(quote!($call));
    if let Some(index) = error_result {
        cx.use_errors();
        let thrown = throw(cx, Exit::Callback(Some(index)), quote!(errors.New(acl.AsString())));
        body.push(quote!(if acl != nil $(block(thrown))));
    }
    let returned = site.callback_result(error_result);
    match values {
        [] => {}
        [single] => {
            body.push(extract_at(cx, &returned, ty.sibling(single), "ret", "r0", depth + 1));
        }
        many => {
            let mut each = Vec::with_capacity(many.len());
            for (i, result) in many.iter().enumerate() {
                let item = format!("arr.Value[{i}]");
                let into = extract_at(cx, &returned, ty.sibling(result), &item, &format!("r{i}"), depth + 1);
                each.push(quote!(if len(arr.Value) > $(i.to_string()) $(block(into))));
            }
            body.push(quote!(if arr, ok := ret.(*data.ArrayValue); ok $(block(lines(each)))));
        }
    }
    if !results.is_empty() {
        body.push(quote!(return));
    }

    let native = native_arm(cx, site, &GoType::ident(target), dst);
    let fail = mismatch(cx, site);
    let closure = lines([
        quote!(fnv := v),
        quote!($dst = $header $(block(lines(body)))),
    ]);
    switch(
        quote!(v := $(value).(type)),
        [
            quote!(case nil:),
            arm(quote!(case *data.FuncValue:), closure),
            native,
            arm(quote!(default:), fail),
        ],
    )
}

/// Values with no richer strategy: the empty interface takes any payload,
/// everything else must already hold the native type.
fn extract_opaque(cx: &mut FileContext<'_>, site: &Site, ty: Ty<'_>, value: &str, dst: &str) -> Tokens<Go> {
    let target = cx.go_type(ty.expr());
    if target == GoType::ident("any") || ty.is_empty_interface() {
        let source = quote!($dst = p.GetSource());
        let unwrap = quote!(if p, ok := v.Class.(data.GetSource); ok $(block(source)) else $(block(quote!($dst = v))));
        return switch(
            quote!(v := $(value).(type)),
            [
                arm(quote!(case *data.ClassValue:), unwrap),
                arm(quote!(case data.GetSource:), quote!($dst = v.GetSource())),
                arm(quote!(case *data.AnyValue:), quote!($dst = v.Value)),
                arm(quote!(default:), quote!($dst = v)),
            ],
        );
    }
    let nilable = target.is_nilable() || ty.kind() == Kind::Pointer;
    let native = native_arm(cx, site, &target, dst);
    let fail = mismatch(cx, site);
    let mut arms = Vec::new();
    if nilable {
        arms.push(quote!(case nil:));
    }
    arms.push(native);
    arms.push(arm(quote!(default:), fail));
    switch(quote!(v := $(value).(type)), arms)
}

/// Expression wrapping the native `expr` of type `ty` as an interpreter value.
///
/// Classes come back as class values around a fresh proxy; scalars use their
/// value constructors and everything else is opaque.
pub fn wrap(cx: &mut FileContext<'_>, ty: Ty<'_>, expr: &str, host: HostCtx) -> String {
    let strategy = classify_conversion(ty, &cx.config().blacklist);
    if strategy.is_proxied() {
        if let Some(target) = proxy_target(ty) {
            if let (Some(package), Some(name)) = (target.class.pkg_path(), target.class.name()) {
                let ctor = cx.class_ctor(package, name);
                let arg = match target.holding {
                    Holding::Value => format!("&{expr}"),
                    Holding::Pointer | Holding::Interface => expr.to_string(),
                };
                let ctx = host.expr(cx);
                cx.use_data();
                return format!("data.NewClassValue({ctor}({arg}), {ctx})");
            }
        }
    }
    wrap_plain(cx, ty, expr)
}

/// Like [`wrap`] but never constructs a proxy.
pub fn wrap_plain(cx: &mut FileContext<'_>, ty: Ty<'_>, expr: &str) -> String {
    cx.use_data();
    match classify_conversion(ty, &cx.config().blacklist) {
        ConversionStrategy::String => format!("data.NewStringValue({expr})"),
        ConversionStrategy::NamedScalar(BasicKind::String) => {
            format!("data.NewStringValue(string({expr}))")
        }
        ConversionStrategy::Boolean => format!("data.NewBoolValue({expr})"),
        ConversionStrategy::NamedScalar(BasicKind::Bool) => {
            format!("data.NewBoolValue(bool({expr}))")
        }
        ConversionStrategy::PrimitiveScalar(kind) | ConversionStrategy::NamedScalar(kind)
            if kind.is_float() =>
        {
            format!("data.NewFloatValue(float64({expr}))")
        }
        ConversionStrategy::PrimitiveScalar(kind) | ConversionStrategy::NamedScalar(kind)
            if kind.is_integer() =>
        {
            format!("data.NewIntValue(int({expr}))")
        }
        _ => format!("data.NewAnyValue({expr})"),
    }
}
