//! Whole-program integration tests driving the loader and the engine
//! together through in-memory buffers: the literal scenarios a
//! conformant interpreter must handle, plus a few round-trip
//! properties worth checking directly.

use std::io::Cursor;

use ippcode20::{Executor, StopCode};
use ippcode20_loader::load;

fn run(xml: &str, stdin: &str) -> (ippcode20::Result<StopCode>, String, String) {
    let program = load(xml).expect("xml should load");
    let mut input = Cursor::new(stdin.as_bytes().to_vec());
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let result = {
        let mut executor = Executor::new(&program, &mut input, &mut stdout, &mut stderr).unwrap();
        executor.run()
    };
    (result, String::from_utf8(stdout).unwrap(), String::from_utf8(stderr).unwrap())
}

#[test]
fn hello_world() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="WRITE">
    <arg1 type="string">Hello\032world</arg1>
  </instruction>
</program>"#;
    let (result, stdout, _) = run(xml, "");
    assert_eq!(result.unwrap(), StopCode::Completed);
    assert_eq!(stdout, "Hello world");
}

#[test]
fn frames() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@a</arg1></instruction>
  <instruction order="2" opcode="MOVE"><arg1 type="var">GF@a</arg1><arg2 type="int">1</arg2></instruction>
  <instruction order="3" opcode="CREATEFRAME"></instruction>
  <instruction order="4" opcode="DEFVAR"><arg1 type="var">TF@a</arg1></instruction>
  <instruction order="5" opcode="MOVE"><arg1 type="var">TF@a</arg1><arg2 type="int">2</arg2></instruction>
  <instruction order="6" opcode="PUSHFRAME"></instruction>
  <instruction order="7" opcode="ADD"><arg1 type="var">GF@a</arg1><arg2 type="var">GF@a</arg2><arg3 type="var">LF@a</arg3></instruction>
  <instruction order="8" opcode="WRITE"><arg1 type="var">GF@a</arg1></instruction>
</program>"#;
    let (result, stdout, _) = run(xml, "");
    assert_eq!(result.unwrap(), StopCode::Completed);
    assert_eq!(stdout, "3");
}

#[test]
fn call_and_return() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="CALL"><arg1 type="label">L</arg1></instruction>
  <instruction order="2" opcode="WRITE"><arg1 type="string">after</arg1></instruction>
  <instruction order="3" opcode="EXIT"><arg1 type="int">0</arg1></instruction>
  <instruction order="4" opcode="LABEL"><arg1 type="label">L</arg1></instruction>
  <instruction order="5" opcode="WRITE"><arg1 type="string">in</arg1></instruction>
  <instruction order="6" opcode="RETURN"></instruction>
</program>"#;
    let (result, stdout, _) = run(xml, "");
    assert_eq!(result.unwrap(), StopCode::Exited(0));
    assert_eq!(stdout, "inafter");
}

#[test]
fn division_by_zero_is_57() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
  <instruction order="2" opcode="IDIV"><arg1 type="var">GF@x</arg1><arg2 type="int">5</arg2><arg3 type="int">0</arg3></instruction>
</program>"#;
    let (result, _, _) = run(xml, "");
    assert_eq!(result.unwrap_err().exit_code(), 57);
}

#[test]
fn missing_value_is_56() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
  <instruction order="2" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
</program>"#;
    let (result, _, _) = run(xml, "");
    assert_eq!(result.unwrap_err().exit_code(), 56);
}

#[test]
fn type_mismatch_is_53() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
  <instruction order="2" opcode="ADD"><arg1 type="var">GF@x</arg1><arg2 type="int">1</arg2><arg3 type="string">foo</arg3></instruction>
</program>"#;
    let (result, _, _) = run(xml, "");
    assert_eq!(result.unwrap_err().exit_code(), 53);
}

#[test]
fn stack_arithmetic() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="PUSHS"><arg1 type="int">3</arg1></instruction>
  <instruction order="2" opcode="PUSHS"><arg1 type="int">4</arg1></instruction>
  <instruction order="3" opcode="ADDS"></instruction>
  <instruction order="4" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
  <instruction order="5" opcode="POPS"><arg1 type="var">GF@x</arg1></instruction>
  <instruction order="6" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
</program>"#;
    let (result, stdout, _) = run(xml, "");
    assert_eq!(result.unwrap(), StopCode::Completed);
    assert_eq!(stdout, "7");
}

#[test]
fn exit_code_passthrough() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="EXIT"><arg1 type="int">42</arg1></instruction>
</program>"#;
    let (result, _, _) = run(xml, "");
    assert_eq!(result.unwrap(), StopCode::Exited(42));
}

#[test]
fn read_parse_failure_coerces_to_nil() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
  <instruction order="2" opcode="READ"><arg1 type="var">GF@x</arg1><arg2 type="type">int</arg2></instruction>
  <instruction order="3" opcode="TYPE"><arg1 type="var">GF@x</arg1><arg2 type="var">GF@x</arg2></instruction>
  <instruction order="4" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>
</program>"#;
    let (result, stdout, _) = run(xml, "not-a-number\n");
    assert_eq!(result.unwrap(), StopCode::Completed);
    assert_eq!(stdout, "nil");
}

#[test]
fn round_trip_int2char_stri2int() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@c</arg1></instruction>
  <instruction order="2" opcode="INT2CHAR"><arg1 type="var">GF@c</arg1><arg2 type="int">97</arg2></instruction>
  <instruction order="3" opcode="DEFVAR"><arg1 type="var">GF@n</arg1></instruction>
  <instruction order="4" opcode="STRI2INT"><arg1 type="var">GF@n</arg1><arg2 type="var">GF@c</arg2><arg3 type="int">0</arg3></instruction>
  <instruction order="5" opcode="WRITE"><arg1 type="var">GF@n</arg1></instruction>
</program>"#;
    let (result, stdout, _) = run(xml, "");
    assert_eq!(result.unwrap(), StopCode::Completed);
    assert_eq!(stdout, "97");
}

#[test]
fn move_chain_preserves_value_and_type() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
  <instruction order="2" opcode="DEFVAR"><arg1 type="var">GF@y</arg1></instruction>
  <instruction order="3" opcode="DEFVAR"><arg1 type="var">GF@z</arg1></instruction>
  <instruction order="4" opcode="MOVE"><arg1 type="var">GF@y</arg1><arg2 type="string">hi</arg2></instruction>
  <instruction order="5" opcode="MOVE"><arg1 type="var">GF@x</arg1><arg2 type="var">GF@y</arg2></instruction>
  <instruction order="6" opcode="MOVE"><arg1 type="var">GF@z</arg1><arg2 type="var">GF@x</arg2></instruction>
  <instruction order="7" opcode="WRITE"><arg1 type="var">GF@z</arg1></instruction>
</program>"#;
    let (result, stdout, _) = run(xml, "");
    assert_eq!(result.unwrap(), StopCode::Completed);
    assert_eq!(stdout, "hi");
}

#[test]
fn add_then_sub_is_identity_for_ints() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@a</arg1></instruction>
  <instruction order="2" opcode="MOVE"><arg1 type="var">GF@a</arg1><arg2 type="int">17</arg2></instruction>
  <instruction order="3" opcode="ADD"><arg1 type="var">GF@a</arg1><arg2 type="var">GF@a</arg2><arg3 type="int">5</arg3></instruction>
  <instruction order="4" opcode="SUB"><arg1 type="var">GF@a</arg1><arg2 type="var">GF@a</arg2><arg3 type="int">5</arg3></instruction>
  <instruction order="5" opcode="WRITE"><arg1 type="var">GF@a</arg1></instruction>
</program>"#;
    let (result, stdout, _) = run(xml, "");
    assert_eq!(result.unwrap(), StopCode::Completed);
    assert_eq!(stdout, "17");
}

#[test]
fn unknown_opcode_is_32() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="FROBNICATE"></instruction>
</program>"#;
    let program = load(xml).unwrap();
    let err = ippcode20::bind::bind_program(&program).unwrap_err();
    assert_eq!(err.exit_code(), 32);
}

#[test]
fn jump_to_undefined_label_is_52() {
    let xml = r#"<program language="IPPcode20">
  <instruction order="1" opcode="JUMP"><arg1 type="label">nowhere</arg1></instruction>
</program>"#;
    let (result, _, _) = run(xml, "");
    assert_eq!(result.unwrap_err().exit_code(), 52);
}
