//! Class wrappers for struct and interface types.

use std::collections::HashSet;

use genco::prelude::*;
use wrapgen_go::naming::{is_exported_name, property_name, resolve_method_keys};
use wrapgen_go::{arm, block, decls, lines, switch, GoIdentifier, GoType};
use wrapgen_reflect::{Kind, Method, Ty};

use crate::context::{is_expressible, FileContext};
use crate::convert::{declare_and_extract, throw, throw_message, wrap, Exit, HostCtx, Site};
use crate::error::GenerateError;
use crate::method::adapter_name;

/// An exported method bound to its dispatch key.
#[derive(Debug, Clone)]
pub struct MethodSlot<'u> {
    /// Key the interpreter looks the method up with.
    pub key: String,
    /// Field of the class struct holding the adapter.
    pub field: String,
    pub method: &'u Method,
}

/// An exported struct field exposed as a property.
#[derive(Debug, Clone)]
pub struct PropertyPlan<'u> {
    pub name: String,
    pub field: &'u str,
    pub ty: Ty<'u>,
}

/// The decided shape of one class wrapper.
#[derive(Debug, Clone)]
pub struct WrapperPlan<'u> {
    ty: Ty<'u>,
    package_path: &'u str,
    name: &'u str,
    interface: bool,
    methods: Vec<MethodSlot<'u>>,
    properties: Vec<PropertyPlan<'u>>,
}

fn is_callable(method: &Method) -> bool {
    method
        .signature
        .params
        .iter()
        .chain(&method.signature.results)
        .all(is_expressible)
}

impl<'u> WrapperPlan<'u> {
    /// Plans the wrapper of the named struct or interface `ty`, after
    /// unwrapping one pointer.
    pub fn new(ty: Ty<'u>) -> Result<Self, GenerateError> {
        let ty = ty.deref();
        let interface = match ty.kind() {
            Kind::Struct => false,
            Kind::Interface => true,
            _ => return Err(GenerateError::NotClassLike(ty.to_string())),
        };
        let (Some(package_path), Some(name)) = (ty.pkg_path(), ty.name()) else {
            return Err(GenerateError::NotClassLike(ty.to_string()));
        };

        let exported: Vec<&'u Method> = ty
            .methods()
            .into_iter()
            .filter(|m| is_exported_name(&m.name))
            .filter(|m| {
                let callable = is_callable(m);
                if !callable {
                    log::debug!("{name}.{}: signature uses unexported types, skipping", m.name);
                }
                callable
            })
            .collect();
        let methods = resolve_method_keys(exported.iter().map(|m| m.name.as_str()))
            .into_iter()
            .filter_map(|key| {
                let method = exported.iter().copied().find(|m| m.name == key.method)?;
                Some(MethodSlot {
                    field: GoIdentifier::private(key.key.as_str()).to_string(),
                    key: key.key,
                    method,
                })
            })
            .collect();

        let mut seen = HashSet::new();
        let properties = ty
            .fields()
            .iter()
            .filter(|f| is_exported_name(&f.name) && is_expressible(&f.ty))
            .filter_map(|f| {
                let property = property_name(&f.name);
                if !seen.insert(property.clone()) {
                    log::warn!(
                        "{name}.{}: property {property} is already taken by another field, skipping",
                        f.name
                    );
                    return None;
                }
                Some(PropertyPlan {
                    name: property,
                    field: f.name.as_str(),
                    ty: ty.sibling(&f.ty),
                })
            })
            .collect();

        Ok(Self {
            ty,
            package_path,
            name,
            interface,
            methods,
            properties,
        })
    }

    pub fn ty(&self) -> Ty<'u> {
        self.ty
    }

    pub fn package_path(&self) -> &'u str {
        self.package_path
    }

    pub fn name(&self) -> &'u str {
        self.name
    }

    pub fn is_interface(&self) -> bool {
        self.interface
    }

    pub fn methods(&self) -> &[MethodSlot<'u>] {
        &self.methods
    }

    pub fn properties(&self) -> &[PropertyPlan<'u>] {
        &self.properties
    }

    pub fn file_name(&self) -> String {
        format!("{}_class.go", self.name.to_lowercase())
    }

    /// Type of the wrapped value: `*T` for structs, `T` for interfaces.
    pub fn source_type(&self, cx: &mut FileContext<'_>) -> GoType {
        let named = cx.go_type(self.ty.expr());
        if self.interface {
            named
        } else {
            GoType::pointer(named)
        }
    }

    /// Every type a parameter, result or property of the class mentions.
    pub fn referenced_types(&self) -> Vec<Ty<'u>> {
        let methods = self.methods.iter().flat_map(|slot| {
            let signature = &slot.method.signature;
            signature
                .params
                .iter()
                .chain(&signature.results)
                .map(|expr| self.ty.sibling(expr))
        });
        methods
            .chain(self.properties.iter().map(|p| p.ty))
            .collect()
    }

    pub fn generate(&self, cx: &mut FileContext<'_>) -> Tokens<Go> {
        cx.use_data();
        cx.use_node();
        let class = format!("{}Class", self.name);
        let class = class.as_str();
        let source = self.source_type(cx);
        let prefix = cx.config().name_prefix_for(self.package_path);

        let ctor = format!("New{class}");
        let ctor_from = format!("New{class}From");

        let mut members = vec![quote!(source: source,)];
        members.extend(self.methods.iter().map(|slot| {
            let adapter = adapter_name(self.name, &slot.method.name);
            quote!($(slot.field.as_str()): &$(adapter.as_str()){source: source},)
        }));
        let mut fields = vec![quote!(node.Node), quote!(source $(source.clone()))];
        fields.extend(
            self.methods
                .iter()
                .map(|slot| quote!($(slot.field.as_str()) data.Method)),
        );

        let zero = if self.interface {
            quote!($(ctor_from.as_str())(nil))
        } else {
            let named = cx.go_type(self.ty.expr());
            quote!($(ctor_from.as_str())(&$(named){}))
        };

        let get_property = self.get_property(cx, class);
        let set_property = self.set_property(cx, class);
        let get_method = self.get_method(class);

        let new_empty = quote!(return $(ctor_from.as_str())(nil));
        let new_from = quote!(return &$class$(block(lines(members))));
        let proxy = quote!(return data.NewProxyValue($zero, ctx.CreateBaseContext()), nil);
        let accessors = lines([
            quote!(func (s *$class) GetName() string { return $(quoted(format!("{prefix}\\{}", self.name))) }),
            quote!(func (s *$class) GetExtend() *string { return nil }),
            quote!(func (s *$class) GetImplements() []string { return nil }),
            quote!(func (s *$class) AsString() string { return $(quoted(format!("{}{{}}", self.name))) }),
            quote!(func (s *$class) GetSource() any { return s.source }),
            quote!(func (s *$class) GetConstruct() data.Method { return nil }),
        ]);

        let names: Vec<String> = self.properties.iter().map(|p| p.name.clone()).collect();
        let collect = quote!(if property, ok := s.GetProperty(name); ok $(block(quote!(properties[name] = property))));
        let all_properties = lines([
            quote!(properties := map[string]data.Property{}),
            quote!(for _, name := range []string{$(for name in names join (, ) => $(quoted(name)))} $(block(collect))),
            quote!(return properties),
        ]);
        let method_refs: Vec<Tokens<Go>> = self
            .methods
            .iter()
            .map(|slot| quote!(s.$(slot.field.as_str()),))
            .collect();
        let all_methods = quote!(return []data.Method$(block(lines(method_refs))));

        decls([
            quote!(func $(ctor.as_str())() data.ClassStmt $(block(new_empty))),
            quote!(func $(ctor_from.as_str())(source $(source.clone())) data.ClassStmt $(block(new_from))),
            quote!(type $class struct $(block(lines(fields)))),
            quote!(func (s *$class) GetValue(ctx data.Context) (data.GetValue, data.Control) $(block(proxy))),
            accessors,
            get_property,
            quote!(func (s *$class) GetProperties() map[string]data.Property $(block(all_properties))),
            set_property,
            get_method,
            quote!(func (s *$class) GetMethods() []data.Method $(block(all_methods))),
        ])
    }

    fn get_property(&self, cx: &mut FileContext<'_>, class: &str) -> Tokens<Go> {
        let none = quote!(return nil, false);
        if self.properties.is_empty() {
            return quote!(func (s *$class) GetProperty(name string) (data.Property, bool) $(block(none)));
        }
        let cases: Vec<Tokens<Go>> = self
            .properties
            .iter()
            .map(|p| {
                let value = wrap(cx, p.ty, &format!("s.source.{}", p.field), HostCtx::Detached);
                let name = quoted(p.name.clone());
                arm(
                    quote!(case $(name.clone()):),
                    quote!(return node.NewProperty(nil, $name, "public", true, $(value.as_str())), true),
                )
            })
            .collect();
        let body = lines([
            quote!(if s.source == nil $(block(none.clone()))),
            switch(quote!(name), cases),
            none,
        ]);
        quote!(func (s *$class) GetProperty(name string) (data.Property, bool) $(block(body)))
    }

    fn set_property(&self, cx: &mut FileContext<'_>, class: &str) -> Tokens<Go> {
        cx.use_errors();
        let unknown = throw(
            cx,
            Exit::Control,
            quote!(errors.New($(quoted(format!("{}: unknown property ", self.name))) + name)),
        );
        if self.properties.is_empty() {
            return quote!(func (s *$class) SetProperty(name string, value data.Value) data.Control $(block(unknown)));
        }
        let no_source = throw_message(
            cx,
            Exit::Control,
            &format!("{}: property set without a source value", self.name),
        );
        let mut cases: Vec<Tokens<Go>> = self
            .properties
            .iter()
            .map(|p| {
                let site = Site::property(self.name, &p.name);
                let extract = declare_and_extract(cx, &site, p.ty, "value", "val");
                arm(
                    quote!(case $(quoted(p.name.clone())):),
                    lines([extract, quote!(s.source.$(p.field) = val), quote!(return nil)]),
                )
            })
            .collect();
        cases.push(arm(quote!(default:), unknown));
        let body = lines([quote!(if s.source == nil $(block(no_source))), switch(quote!(name), cases)]);
        quote!(func (s *$class) SetProperty(name string, value data.Value) data.Control $(block(body)))
    }

    fn get_method(&self, class: &str) -> Tokens<Go> {
        let none = quote!(return nil, false);
        if self.methods.is_empty() {
            return quote!(func (s *$class) GetMethod(name string) (data.Method, bool) $(block(none)));
        }
        let cases: Vec<Tokens<Go>> = self
            .methods
            .iter()
            .map(|slot| {
                arm(
                    quote!(case $(quoted(slot.key.as_str())):),
                    quote!(return s.$(slot.field.as_str()), true),
                )
            })
            .collect();
        let body = lines([switch(quote!(name), cases), none]);
        quote!(func (s *$class) GetMethod(name string) (data.Method, bool) $(block(body)))
    }
}
