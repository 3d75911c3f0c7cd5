//! Default value filling
//!
//! Validation never mutates its input. Callers that want declared
//! `default`s applied ask for them explicitly and get a filled copy back.

use crate::registry::Lexicons;
use crate::resolution::{LexUri, RefResolutionError};
use crate::types::LexType;
use crate::value::LexValue;
use crate::Result;
use indexmap::IndexMap;

impl Lexicons {
    /// Return a copy of `value` with record defaults filled in
    ///
    /// Every absent property whose own descriptor is a `string`, `integer`
    /// or `boolean` with a `default` is inserted; present nested objects are
    /// filled recursively. Refs are only resolved for present objects, so
    /// absent properties never touch the registry.
    pub fn fill_record_defaults(&self, nsid: &str, value: &LexValue) -> Result<LexValue> {
        let (uri, record) = self.record_def(nsid)?;
        let mut filled = value.clone();
        self.fill_properties(&uri.nsid, &record.record.properties, &mut filled, "Record")?;
        Ok(filled)
    }

    /// Return a copy of XRPC params with declared defaults filled in
    pub fn fill_params_defaults(&self, nsid: &str, value: &LexValue) -> Result<LexValue> {
        let uri = LexUri::parse(nsid, None)?;
        let parameters = match self.resolve(&uri)? {
            LexType::Query(query) => query.parameters.as_ref(),
            LexType::Procedure(procedure) => procedure.parameters.as_ref(),
            _ => {
                return Err(crate::Error::InvalidDefType {
                    uri: uri.to_string(),
                    expected: "query or procedure".to_string(),
                })
            }
        };

        let mut filled = value.clone();
        if let Some(params) = parameters {
            self.fill_properties(&uri.nsid, &params.properties, &mut filled, "Params")?;
        }
        Ok(filled)
    }

    fn fill_properties(
        &self,
        nsid: &str,
        properties: &IndexMap<String, LexType>,
        value: &mut LexValue,
        path: &str,
    ) -> Result<()> {
        let Some(map) = value.as_object_mut() else {
            return Ok(());
        };

        for (name, prop) in properties {
            match map.get_mut(name) {
                None => {
                    if let Some(default) = default_value(prop) {
                        map.insert(name.clone(), default);
                    }
                }
                Some(field) if field.as_object().is_some() => {
                    let prop_path = format!("{path}/{name}");
                    let (prop_nsid, def) = self.follow_refs(nsid, prop, &prop_path)?;
                    if let LexType::Object(object) = def {
                        self.fill_properties(&prop_nsid, &object.properties, field, &prop_path)?;
                    }
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Chase `ref` descriptors to the definition they name
    fn follow_refs<'a>(
        &'a self,
        nsid: &str,
        def: &'a LexType,
        path: &str,
    ) -> Result<(String, &'a LexType)> {
        let max = self.config().max_ref_depth;
        let mut nsid = nsid.to_string();
        let mut def = def;
        let mut hops = 0;

        while let LexType::Ref(reference) = def {
            if hops >= max {
                return Err(RefResolutionError::DepthExceeded {
                    max,
                    path: path.to_string(),
                }
                .into());
            }
            let uri = LexUri::parse(&reference.ref_to, Some(&nsid))?;
            def = self.resolve(&uri)?;
            nsid = uri.nsid;
            hops += 1;
        }

        Ok((nsid, def))
    }
}

fn default_value(def: &LexType) -> Option<LexValue> {
    match def {
        LexType::String(string) => string.constraints.default.clone().map(LexValue::String),
        LexType::Integer(integer) => integer.constraints.default.map(LexValue::Integer),
        LexType::Boolean(boolean) => boolean.constraints.default.map(LexValue::Bool),
        _ => None,
    }
}
