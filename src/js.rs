/*
 * Copyright 2018-2024 Felix Garcia Carballeira, Alejandro Calderon Mateos, Diego Camarmas Alonso,
 * Álvaro Guerrero Espinosa
 *
 * This file is part of CREATOR.
 *
 * CREATOR is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Lesser General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * CREATOR is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public License
 * along with CREATOR.  If not, see <http://www.gnu.org/licenses/>.
 */

use self_cell::self_cell;
use wasm_bindgen::prelude::*;

use crate::target::Target;
use crate::translator::{translate, Options, Unit};
use crate::RenderError;

/// Installs a panic hook that forwards panic messages to the browser console
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

self_cell!(
    /// Target machine description
    #[wasm_bindgen]
    pub struct TargetJS {
        owner: String,
        #[covariant]
        dependent: Target,
    }
);

#[wasm_bindgen]
#[allow(clippy::use_self)] // wasm_bindgen doesn't support using `Self` on nested types
impl TargetJS {
    /// Gets the description of the standard Hack machine
    #[must_use]
    pub fn hack() -> TargetJS {
        set_panic_hook();
        Self::new(String::new(), |_| Target::HACK)
    }

    /// Load a target machine description from `JSON`
    ///
    /// # Parameters
    ///
    /// * `json`: `JSON` data to deserialize
    ///
    /// # Errors
    ///
    /// Errors if the input `JSON` data is invalid, either because it's ill-formatted or because it
    /// doesn't conform to the schema
    pub fn from_json(json: String) -> Result<TargetJS, String> {
        set_panic_hook();
        Self::try_new(json, |json| Target::from_json(json)).map_err(|e| e.to_string())
    }

    /// Gets the `JSON` schema of the target machine descriptions
    #[must_use]
    pub fn schema() -> String {
        Target::schema()
    }

    #[wasm_bindgen(js_name = toString)]
    #[must_use]
    pub fn debug(&self) -> String {
        format!("{:#?}", self.borrow_dependent())
    }

    /// Translates a single translation unit to Hack assembly
    ///
    /// # Parameters
    ///
    /// * `unit`: name of the translation unit, used to scope its static variables
    /// * `src`: VM code to translate
    /// * `bootstrap`: whether to prepend the startup code
    /// * `annotate`: whether to precede the code of each command with the command as a comment
    ///
    /// # Errors
    ///
    /// Errors if the VM code has a syntactical or semantical error. The error is rendered as HTML
    pub fn translate(
        &self,
        unit: &str,
        src: &str,
        bootstrap: bool,
        annotate: bool,
    ) -> Result<String, String> {
        let units = [Unit { name: unit, src }];
        let options = Options {
            bootstrap,
            annotate,
        };
        translate(self.borrow_dependent(), &units, options).map_err(|e| {
            let filename = format!("{unit}.vm");
            let rendered = e.render(&filename, src, true);
            ansi_to_html::convert(&rendered).unwrap_or(rendered)
        })
    }
}
