//! Statement-level translation through the public API

use pretty_assertions::assert_eq;
use vbscript_translator::{
    DeclaredKind, ExpressionReturnType, Parameter, ParentRoutine, RoutineKind,
    ScopeAccessInformation, ScopeLocation, StatementTranslator, TranslationError,
    TranslatorConfig,
};
use vbscript_translator_syntax::testing::*;
use vbscript_translator_syntax::{
    Expression, Operator, Statement, ValueSettingKind, ValueSettingStatement,
};

fn script_scope() -> ScopeAccessInformation {
    ScopeAccessInformation::outermost()
        .declare("a", DeclaredKind::Variable, ScopeLocation::Outermost)
        .declare("b", DeclaredKind::Variable, ScopeLocation::Outermost)
        .declare("c", DeclaredKind::Variable, ScopeLocation::Outermost)
        .declare("d", DeclaredKind::Variable, ScopeLocation::Outermost)
        .declare("e", DeclaredKind::Variable, ScopeLocation::Outermost)
        .declare("F", DeclaredKind::Function, ScopeLocation::Outermost)
}

fn let_statement(target: Expression, value: Expression) -> ValueSettingStatement {
    ValueSettingStatement::new(target, value, ValueSettingKind::Let)
}

fn translate_assignment(
    translator: &StatementTranslator,
    statement: &ValueSettingStatement,
    scope: &ScopeAccessInformation,
) -> String {
    translator
        .translate_value_setting_statement(statement, scope)
        .unwrap()
        .content
}

#[test]
fn test_long_concatenation_is_a_single_call() {
    // a = b & c & d & e
    let value = binary(
        binary(
            binary(var("b"), Operator::Concatenate, var("c")),
            Operator::Concatenate,
            var("d"),
        ),
        Operator::Concatenate,
        var("e"),
    );
    let translator = StatementTranslator::default_config();
    let translated = translator
        .translate_value_setting_statement(&let_statement(var("a"), value), &script_scope())
        .unwrap();

    assert_eq!(
        translated.content,
        "_outer.a = _rt.concat(&[&_outer.b, &_outer.c, &_outer.d, &_outer.e])?;"
    );
    assert_eq!(translated.content.matches("concat").count(), 1);
    assert_eq!(translated.variables_accessed.len(), 5);
}

#[test]
fn test_member_of_function_result_is_set_on_the_call() {
    // F(0).Name = 1
    let target = call_set(vec![
        call_segment(&["F"], vec![num(0.0)]),
        call_segment(&["Name"], vec![]),
    ]);
    let translator = StatementTranslator::default_config();
    assert_eq!(
        translate_assignment(&translator, &let_statement(target, num(1.0)), &script_scope()),
        r#"_rt.set(vbs::Value::Integer(1), &_outer.me, &_rt.call(&_outer.me, &_outer.me, &["F"], &mut _rt.args().val(&vbs::Value::Integer(0)))?, Some("Name"), &mut _rt.args())?;"#
    );
}

#[test]
fn test_function_with_arguments_as_target_is_set_on_its_container() {
    // F(0) = 1
    let translator = StatementTranslator::default_config();
    assert_eq!(
        translate_assignment(
            &translator,
            &let_statement(call(&["F"], vec![num(0.0)]), num(1.0)),
            &script_scope()
        ),
        r#"_rt.set(vbs::Value::Integer(1), &_outer.me, &_outer.me, Some("F"), &mut _rt.args().val(&vbs::Value::Integer(0)))?;"#
    );
}

#[test]
fn test_string_literal_compared_with_number_is_coerced() {
    // "aa" > 0
    let translator = StatementTranslator::default_config();
    let translated = translator
        .translate(
            &binary(string("aa"), Operator::GreaterThan, num(0.0)),
            &script_scope(),
            ExpressionReturnType::Boolean,
        )
        .unwrap();
    assert_eq!(
        translated.content,
        r#"_rt.truthy(&_rt.gt(&_rt.num(&vbs::Value::from("aa"))?, &vbs::Value::Integer(0))?)?"#
    );
    assert_eq!(translated.return_type, ExpressionReturnType::Boolean);
}

#[test]
fn test_by_ref_parameter_mappings() {
    let scope = ScopeAccessInformation::for_routine(
        ParentRoutine::new("F", RoutineKind::Function, vec![Parameter::by_ref("a")]),
        Some("retval"),
    )
    .declare("G", DeclaredKind::Function, ScopeLocation::Outermost);
    let translator = StatementTranslator::default_config();

    let passed_on = translator
        .by_ref_aliases(&call(&["G"], vec![var("a")]), &scope)
        .unwrap();
    assert_eq!(passed_on.len(), 1);
    assert!(passed_on[0].from.matches("a"));
    assert!(!passed_on[0].mapped_from_read_only);

    let computed = translator
        .by_ref_aliases(
            &call(&["G"], vec![binary(var("a"), Operator::Add, num(1.0))]),
            &scope,
        )
        .unwrap();
    assert!(computed.is_empty());

    let trapped = translator
        .by_ref_aliases(
            &call(&["G"], vec![binary(var("a"), Operator::Add, num(1.0))]),
            &scope.with_error_token("errortoken1"),
        )
        .unwrap();
    assert_eq!(trapped.len(), 1);
    assert!(trapped[0].mapped_from_read_only);
}

#[test]
fn test_configured_identifiers_flow_into_output() {
    let config = TranslatorConfig::from_toml_str(
        r#"
provider = "runtime"
outer = "globals"
runtime_crate = "vbscript_runtime"
"#,
    )
    .unwrap();
    let translator = StatementTranslator::new(config);
    let statement = Statement::new(call(&["F"], vec![num(1.0)]));
    let translated = translator
        .translate_statement(&statement, &script_scope())
        .unwrap();
    assert_eq!(
        translated.content,
        r#"runtime.call(&globals.me, &globals.me, &["F"], &mut runtime.args().val(&vbscript_runtime::Value::Integer(1)))?;"#
    );
}

#[test]
fn test_trapped_region_round_trip() {
    let translator = StatementTranslator::default_config();
    let (token, acquire) = translator.translate_error_token_acquisition();
    let scope = script_scope().with_error_token(token);

    let statements = [
        acquire.content,
        translator.translate_on_error_resume_next(&scope, 0).unwrap().content,
        translate_assignment(&translator, &let_statement(var("a"), var("b")), &scope),
        translator.translate_on_error_goto_0(&scope, 1).unwrap().content,
        translator.translate_error_token_release(&scope, 2).unwrap().content,
    ];
    insta::assert_snapshot!(statements.join("\n"), @r"
    let errortoken1 = _rt.get_error_trapping_token();
    _rt.start_error_trapping(errortoken1)?;
    _rt.handle_error(errortoken1, || {
        _outer.a = _rt.val(&_outer.b)?;
        Ok(())
    })?;
    _rt.stop_error_trapping(errortoken1)?;
    _rt.release_error_trapping_token(errortoken1);
    ");
}

#[test]
fn test_error_statements_without_token_fail() {
    let translator = StatementTranslator::default_config();
    let err = translator
        .translate_on_error_resume_next(&script_scope(), 4)
        .unwrap_err();
    assert!(matches!(err, TranslationError::MissingErrorToken { line_index: 4 }));
    assert_eq!(err.line_index(), Some(4));
}
