use genco::prelude::*;

use crate::imports::ImportSet;

/// Header written at the top of every generated file.
pub const GENERATED_HEADER: &str = "// Code generated by wrapgen; DO NOT EDIT.\n\n";

/// One generated Go source file: package clause, imports and declarations.
pub struct GoFile {
    package: String,
    imports: ImportSet,
    body: Tokens<Go>,
}

impl GoFile {
    pub fn new(package: impl Into<String>, imports: ImportSet, body: Tokens<Go>) -> Self {
        Self {
            package: package.into(),
            imports,
            body,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn imports(&self) -> &ImportSet {
        &self.imports
    }

    /// Renders the file with tab indentation, preceded by [`GENERATED_HEADER`].
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut tokens: Tokens<Go> = Tokens::new();
        if !self.imports.is_empty() {
            tokens.append(&self.imports);
            tokens.line();
        }
        tokens.append(&self.body);

        let mut w = genco::fmt::FmtWriter::new(String::from(GENERATED_HEADER));
        let fmt = genco::fmt::Config::from_lang::<Go>()
            .with_indentation(genco::fmt::Indentation::Tab);
        let config = go::Config::default().with_package(self.package.as_str());
        tokens.format_file(&mut w.as_formatter(&fmt), &config)?;
        Ok(w.into_inner())
    }
}
