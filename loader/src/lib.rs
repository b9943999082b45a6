//! XML ingest for IPPcode20 source programs. Turns the `<program>`
//! document into a plain [`RawProgram`] the engine crate's bind phase
//! can decode and type-check; this crate knows nothing about
//! opcodes, operand kinds, or frames.
//!
//! The parse is a single forward pass over start/end/text events
//! with a streaming pull-parser (`quick_xml::Reader`) rather than a
//! DOM tree: one instruction is accumulated at a time and validated
//! as it is seen, matching the engine crate's preference for early,
//! specific error returns over a two-phase parse-then-validate
//! structure.

pub mod error;

use std::collections::{BTreeMap, HashMap, HashSet};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub use error::{LoaderError, Result};
use ippcode20::{RawInstruction, RawOperand, RawProgram};

const ROOT_ATTRS: &[&str] = &["language", "description", "name"];

/// Parses a whole IPPcode20 XML document into a [`RawProgram`],
/// instructions sorted ascending by `order`. Any structural deviation
/// from the schema is a [`LoaderError`]; XML that isn't well-formed
/// is `Malformed` (31), everything else `Schema` (32).
pub fn load(xml: &str) -> Result<RawProgram> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut instructions = Vec::new();
    let mut seen_orders = HashSet::new();
    let mut saw_root = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(LoaderError::Malformed)?;
        match event {
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Start(ref e) if !saw_root => {
                check_root_attrs(e)?;
                saw_root = true;
            }
            Event::Empty(ref e) if !saw_root => {
                check_root_attrs(e)?;
                saw_root = true;
            }
            Event::Start(ref e) => {
                let instr = parse_instruction(&mut reader, e, &mut buf)?;
                record_instruction(&mut seen_orders, &mut instructions, instr)?;
            }
            Event::Empty(ref e) => {
                let (opcode, order) = instruction_header(e)?;
                record_instruction(
                    &mut seen_orders,
                    &mut instructions,
                    RawInstruction { opcode, order, operands: Vec::new() },
                )?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(LoaderError::Schema("source has no root element".to_string()));
    }

    instructions.sort_by_key(|i| i.order);
    Ok(RawProgram { instructions })
}

fn record_instruction(
    seen_orders: &mut HashSet<i64>,
    instructions: &mut Vec<RawInstruction>,
    instr: RawInstruction,
) -> Result<()> {
    if !seen_orders.insert(instr.order) {
        return Err(LoaderError::Schema(format!("duplicate instruction order `{}`", instr.order)));
    }
    instructions.push(instr);
    Ok(())
}

/// Collects an element's attributes into a name→value map, unescaping
/// entities as it goes. A repeated attribute name is a schema error;
/// well-formedness of the attribute syntax itself is the parser's job.
fn attrs_map(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| LoaderError::Schema(format!("malformed attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(LoaderError::Malformed)?
            .into_owned();
        if map.insert(key.clone(), value).is_some() {
            return Err(LoaderError::Schema(format!("duplicate attribute `{}`", key)));
        }
    }
    Ok(map)
}

/// Root element attributes are restricted to `{language, description,
/// name}`; the root's own tag name is not constrained further here,
/// matching the reference loader's leniency about it.
fn check_root_attrs(e: &BytesStart) -> Result<()> {
    for key in attrs_map(e)?.keys() {
        if !ROOT_ATTRS.contains(&key.as_str()) {
            return Err(LoaderError::Schema(format!("unexpected root attribute `{}`", key)));
        }
    }
    Ok(())
}

/// Validates an `<instruction>` element's own attributes: exactly
/// `opcode` and `order`, with `order` a non-negative integer.
fn instruction_header(e: &BytesStart) -> Result<(String, i64)> {
    if e.name().as_ref() != b"instruction" {
        return Err(LoaderError::Schema(format!(
            "expected `instruction`, found `{}`",
            String::from_utf8_lossy(e.name().as_ref())
        )));
    }

    let attrs = attrs_map(e)?;
    if attrs.len() != 2 {
        return Err(LoaderError::Schema(
            "instruction must have exactly `opcode` and `order` attributes".to_string(),
        ));
    }
    let opcode = attrs
        .get("opcode")
        .cloned()
        .ok_or_else(|| LoaderError::Schema("instruction is missing `opcode`".to_string()))?;
    let order_text = attrs
        .get("order")
        .ok_or_else(|| LoaderError::Schema("instruction is missing `order`".to_string()))?;
    let order: i64 = order_text
        .parse()
        .map_err(|_| LoaderError::Schema(format!("`{}` is not a valid order", order_text)))?;
    if order < 0 {
        return Err(LoaderError::Schema(format!("order {} is negative", order)));
    }
    Ok((opcode, order))
}

/// Reads an `<instruction>` element's children (`arg1`..`arg3`) up
/// to its matching close tag, enforcing that no name repeats and
/// that the set forms a contiguous prefix starting at `arg1`.
fn parse_instruction(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    buf: &mut Vec<u8>,
) -> Result<RawInstruction> {
    let (opcode, order) = instruction_header(start)?;
    let mut args: BTreeMap<usize, RawOperand> = BTreeMap::new();

    loop {
        let event = reader.read_event_into(buf).map_err(LoaderError::Malformed)?;
        match event {
            Event::Start(ref e) => {
                let (index, operand) = parse_arg(reader, e, buf)?;
                if args.insert(index, operand).is_some() {
                    return Err(LoaderError::Schema(format!("duplicate `arg{}`", index)));
                }
            }
            Event::Empty(ref e) => {
                let index = arg_index(e)?;
                let operand = build_operand(e, String::new())?;
                if args.insert(index, operand).is_some() {
                    return Err(LoaderError::Schema(format!("duplicate `arg{}`", index)));
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"instruction" => break,
            Event::Eof => {
                return Err(LoaderError::Schema("unexpected end of document inside `instruction`".to_string()))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(RawInstruction { opcode, order, operands: contiguous_operands(args)? })
}

fn arg_index(e: &BytesStart) -> Result<usize> {
    match e.name().as_ref() {
        b"arg1" => Ok(1),
        b"arg2" => Ok(2),
        b"arg3" => Ok(3),
        other => Err(LoaderError::Schema(format!(
            "unexpected element `{}`, expected arg1, arg2, or arg3",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn build_operand(e: &BytesStart, text: String) -> Result<RawOperand> {
    let attrs = attrs_map(e)?;
    if attrs.len() != 1 {
        return Err(LoaderError::Schema(format!(
            "`{}` must carry exactly a `type` attribute",
            String::from_utf8_lossy(e.name().as_ref())
        )));
    }
    let type_name = attrs
        .get("type")
        .cloned()
        .ok_or_else(|| LoaderError::Schema("argument is missing `type`".to_string()))?;
    // nil's payload and a missing text node both normalize to "".
    let text = if type_name == "nil" { String::new() } else { text };
    Ok(RawOperand { type_name, text })
}

/// Reads one `<argN>` element's text content up to its matching
/// close tag.
fn parse_arg(reader: &mut Reader<&[u8]>, start: &BytesStart, buf: &mut Vec<u8>) -> Result<(usize, RawOperand)> {
    let index = arg_index(start)?;
    let tag = start.name().as_ref().to_vec();
    let mut text = String::new();

    loop {
        let event = reader.read_event_into(buf).map_err(LoaderError::Malformed)?;
        match event {
            Event::Text(t) => {
                text.push_str(&t.unescape().map_err(LoaderError::Malformed)?);
            }
            Event::End(ref e) if e.name().as_ref() == tag.as_slice() => break,
            Event::Eof => {
                return Err(LoaderError::Schema(format!(
                    "unexpected end of document inside `{}`",
                    String::from_utf8_lossy(&tag)
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok((index, build_operand(start, text)?))
}

/// The set of argument indices, sorted, must form a contiguous prefix
/// starting at 1; `{arg1, arg3}` without `arg2` is invalid even
/// though neither name repeats.
fn contiguous_operands(args: BTreeMap<usize, RawOperand>) -> Result<Vec<RawOperand>> {
    let mut operands = Vec::with_capacity(args.len());
    for (expected, (index, operand)) in args.into_iter().enumerate() {
        if index != expected + 1 {
            return Err(LoaderError::Schema(format!(
                "arguments must form a contiguous prefix starting at arg1, found gap before arg{}",
                index
            )));
        }
        operands.push(operand);
    }
    Ok(operands)
}
