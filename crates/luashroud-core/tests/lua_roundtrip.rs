//! Evaluates rendered config chunks in a real Lua 5.1 interpreter and checks that
//! the resulting tables carry the same settings as the source documents.

use std::error::Error;

use luashroud_core::{ConfigDocument, Preset, lua_table};
use mlua::{Lua, Table, Value as LuaValue};
use serde_json::{Value, json};

type TestResult = Result<(), Box<dyn Error>>;

fn assert_same(lua: &LuaValue, expected: &Value, path: &str) -> TestResult {
    match (lua, expected) {
        (LuaValue::Nil, Value::Null) => {}
        (LuaValue::Boolean(actual), Value::Bool(wanted)) => {
            assert_eq!(actual, wanted, "boolean at {path}");
        }
        (LuaValue::Integer(actual), Value::Number(wanted)) => {
            #[allow(clippy::cast_precision_loss)]
            let actual = *actual as f64;
            assert_eq!(Some(actual), wanted.as_f64(), "number at {path}");
        }
        (LuaValue::Number(actual), Value::Number(wanted)) => {
            assert_eq!(Some(*actual), wanted.as_f64(), "number at {path}");
        }
        (LuaValue::String(actual), Value::String(wanted)) => {
            assert_eq!(&*actual.to_str()?, wanted.as_str(), "string at {path}");
        }
        (LuaValue::Table(table), Value::Array(items)) => {
            assert_eq!(table.raw_len(), items.len(), "length at {path}");
            for (index, item) in items.iter().enumerate() {
                let element: LuaValue = table.raw_get(index + 1)?;
                assert_same(&element, item, &format!("{path}[{}]", index + 1))?;
            }
        }
        (LuaValue::Table(table), Value::Object(entries)) => {
            assert_eq!(
                pair_count(table)?,
                entries.values().filter(|value| !value.is_null()).count(),
                "key count at {path}"
            );
            for (key, value) in entries {
                let element: LuaValue = table.raw_get(key.as_str())?;
                assert_same(&element, value, &format!("{path}.{key}"))?;
            }
        }
        (other, wanted) => {
            return Err(format!("mismatch at {path}: lua {other:?} vs json {wanted}").into());
        }
    }
    Ok(())
}

fn pair_count(table: &Table) -> mlua::Result<usize> {
    let mut count = 0;
    for pair in table.clone().pairs::<LuaValue, LuaValue>() {
        pair?;
        count += 1;
    }
    Ok(count)
}

fn evaluate(chunk: &str) -> Result<(Lua, LuaValue), Box<dyn Error>> {
    let lua = Lua::new();
    let value = lua.load(chunk).eval::<LuaValue>()?;
    Ok((lua, value))
}

#[test]
fn every_preset_document_survives_lua_evaluation() -> TestResult {
    for preset in Preset::ALL {
        let document = preset.document();
        let (_lua, value) = evaluate(&document.to_lua_chunk())?;
        assert_same(&value, &document.into_value(), preset.as_str())?;
    }
    Ok(())
}

#[test]
fn awkward_keys_and_strings_survive_lua_evaluation() -> TestResult {
    let source = json!({
        "LuaVersion": "LuaU",
        "VarNamePrefix": "quote\" slash\\ newline\n tab\t cr\r bell\u{7}",
        "end": true,
        "with space": 1.25,
        "9lives": -3,
        "nested": { "list": ["a", "b", { "deep": false }], "empty": {} },
        "Seed": 0
    });
    let document = ConfigDocument::from_value(source.clone())?;
    let (_lua, value) = evaluate(&document.to_lua_chunk())?;
    assert_same(&value, &source, "root")
}

#[test]
fn bare_expressions_evaluate_in_lua() -> TestResult {
    let (_lua, value) = evaluate(&format!("return {}", lua_table::render(&json!([1, "two", null]))))?;
    let LuaValue::Table(table) = value else {
        return Err("expected a table".into());
    };
    assert_eq!(table.raw_get::<i64>(1)?, 1);
    assert_eq!(table.raw_get::<String>(2)?, "two");
    assert!(table.raw_get::<LuaValue>(3)?.is_nil());
    Ok(())
}
