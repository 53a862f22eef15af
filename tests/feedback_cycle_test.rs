//! Integration tests for the feedback cycle state machine.

mod common;

use common::{
    broken_case, good_case, suite, FailingStorage, Harness, MissingCompiler, Scripted,
    BROKEN_MARKER, INITIAL_PROMPT,
};
use testsmith::domain::errors::{CompilerError, FeedbackCycleError};
use testsmith::domain::models::{FeedbackCycleExecutionResult, ResponseErrorCode, WarningType};
use testsmith::services::artifact_recorder::{LLM_RESPONSE_FILE, LOG_FILE, SENT_PROMPTS_FILE};
use testsmith::services::{FeedbackCycleCollaborators, LlmWithFeedbackCycle};

#[tokio::test]
async fn test_compilable_first_answer_is_accepted() {
    let mut harness = Harness::new(vec![Scripted::Suite(suite(vec![
        good_case("addTest"),
        good_case("subTest"),
    ]))]);

    let outcome = harness.run(3).await;
    let response = outcome.unwrap();

    assert_eq!(response.execution_result(), FeedbackCycleExecutionResult::Ok);
    assert_eq!(response.generated_test_suite().unwrap().test_cases.len(), 2);
    assert_eq!(outcome.requests_count, 1);
    assert_eq!(outcome.report.len(), 2);
    assert_eq!(outcome.report.test_case_list[&1].test_name, "subTest");
    assert!(outcome.warnings.is_empty());

    let iterations = harness.iterations().iterations;
    assert_eq!(iterations.len(), 1);
    assert_eq!(iterations[0].iteration, 1);
    assert_eq!(iterations[0].prompt, INITIAL_PROMPT);

    let compilations = harness.compilations().iterations;
    assert_eq!(compilations.len(), 1);
    assert_eq!(compilations[0].test_suite.exit_code, 0);
    assert_eq!(compilations[0].test_cases.total, 2);
    assert_eq!(compilations[0].test_cases.compilable, 2);

    let suite_source = std::fs::read_to_string(harness.suite_file()).unwrap();
    assert!(suite_source.starts_with("package com.example;"));
    assert!(suite_source.contains("public class CalcTest {"));
}

#[tokio::test]
async fn test_compilation_error_is_fed_back() {
    let mut harness = Harness::new(vec![
        Scripted::Suite(suite(vec![broken_case("addTest")])),
        Scripted::Suite(suite(vec![good_case("addTest")])),
    ]);

    let outcome = harness.run(2).await;

    assert!(outcome.unwrap().is_ok());
    assert_eq!(
        outcome.unwrap().generated_test_suite(),
        Some(&suite(vec![good_case("addTest")]))
    );
    assert_eq!(outcome.requests_count, 2);
    assert_eq!(outcome.warnings, vec![WarningType::CompilationErrorOccurred]);

    let prompts = &harness.request_manager.prompts;
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].starts_with("I cannot compile the tests that you provided."));
    assert!(prompts[1].contains("CalcTest.java:5: error: cannot find symbol"));

    let compilations = harness.compilations().iterations;
    assert_eq!(compilations.len(), 2);
    assert_eq!(compilations[0].test_suite.exit_code, 1);
    assert_eq!(compilations[0].test_cases.compilable, 0);
    assert_eq!(compilations[1].iteration, 2);
    assert_eq!(compilations[1].test_suite.exit_code, 0);
}

#[tokio::test]
async fn test_cancel_before_first_request() {
    let mut harness = Harness::new(vec![Scripted::Suite(suite(vec![good_case("addTest")]))]);
    harness.cancellation.cancel();

    let outcome = harness.run(3).await;
    let response = outcome.unwrap();

    assert_eq!(response.execution_result(), FeedbackCycleExecutionResult::Canceled);
    assert!(response.generated_test_suite().is_none());
    assert!(harness.request_manager.prompts.is_empty());
    assert!(harness.iterations().iterations.is_empty());
    assert!(harness.compilations().iterations.is_empty());
    assert!(!harness.suite_file().exists());
}

#[tokio::test]
async fn test_cancel_while_waiting_for_answer() {
    let mut harness = Harness::new(vec![Scripted::Suite(suite(vec![good_case("addTest")]))]);
    harness.request_manager.cancel_during_request = Some(harness.cancellation.clone());

    let outcome = harness.run(3).await;

    assert_eq!(
        outcome.unwrap().execution_result(),
        FeedbackCycleExecutionResult::Canceled
    );
    assert_eq!(harness.iterations().iterations.len(), 1);
    assert!(harness.compilations().iterations.is_empty());
    assert!(!harness.suite_file().exists());
}

#[tokio::test]
async fn test_prompt_too_long_is_reduced_without_spending_budget() {
    let mut harness = Harness::new(vec![
        Scripted::Error(ResponseErrorCode::PromptTooLong),
        Scripted::Suite(suite(vec![good_case("addTest")])),
    ]);
    harness.reduction = common::CountingReduction::new(1);

    let outcome = harness.run(1).await;

    assert!(outcome.unwrap().is_ok());
    assert_eq!(outcome.requests_count, 1);
    assert_eq!(harness.reduction.calls, 1);
    assert_eq!(
        harness.request_manager.prompts,
        vec![INITIAL_PROMPT.to_string(), "reduced prompt #1".to_string()]
    );

    let iterations = harness.iterations().iterations;
    assert_eq!(iterations.len(), 1, "rejected prompt is not an iteration");
    assert_eq!(iterations[0].iteration, 1);
    assert_eq!(iterations[0].prompt, "reduced prompt #1");

    let sent = harness.artifact_text(SENT_PROMPTS_FILE);
    assert!(sent.contains(INITIAL_PROMPT));
    assert!(sent.contains("reduced prompt #1"));
}

#[tokio::test]
async fn test_prompt_too_long_without_reduction_terminates() {
    let mut harness = Harness::new(vec![Scripted::Error(ResponseErrorCode::PromptTooLong)]);

    let outcome = harness.run(3).await;

    assert_eq!(
        outcome.unwrap().execution_result(),
        FeedbackCycleExecutionResult::ProvidedPromptTooLong
    );
    assert_eq!(harness.request_manager.prompts.len(), 1);
    assert!(harness.iterations().iterations.is_empty());
}

#[tokio::test]
async fn test_prompt_still_too_long_after_reduction_terminates() {
    let mut harness = Harness::new(vec![
        Scripted::Error(ResponseErrorCode::PromptTooLong),
        Scripted::Error(ResponseErrorCode::PromptTooLong),
    ]);
    harness.reduction = common::CountingReduction::new(1);

    let outcome = harness.run(1).await;
    let response = outcome.unwrap();

    assert_eq!(
        response.execution_result(),
        FeedbackCycleExecutionResult::ProvidedPromptTooLong
    );
    assert!(response.generated_test_suite().is_none());
    assert_eq!(harness.reduction.calls, 1);
    assert_eq!(
        harness.request_manager.prompts,
        vec![INITIAL_PROMPT.to_string(), "reduced prompt #1".to_string()]
    );
    assert!(harness.iterations().iterations.is_empty());
    assert!(harness.compilations().iterations.is_empty());
}

#[tokio::test]
async fn test_same_named_cases_are_compiled_separately() {
    let mut harness = Harness::new(vec![Scripted::Suite(suite(vec![
        broken_case("addTest"),
        good_case("addTest"),
    ]))]);

    let outcome = harness.run(1).await;
    let response = outcome.unwrap();

    assert!(response.is_ok());
    assert_eq!(response.compilable_test_cases().len(), 1);
    assert_eq!(
        response.generated_test_suite().unwrap().test_cases,
        vec![good_case("addTest")]
    );

    let suite_source = std::fs::read_to_string(harness.suite_file()).unwrap();
    assert!(!suite_source.contains(BROKEN_MARKER));

    let package_dir = harness.suite_file().parent().unwrap().to_path_buf();
    assert!(package_dir.join("GeneratedAddTest.java").exists());
    assert!(package_dir.join("GeneratedAddTest_1.java").exists());

    let compilations = harness.compilations().iterations;
    assert_eq!(compilations[0].test_cases.total, 2);
    assert_eq!(compilations[0].test_cases.compilable, 1);
}

#[tokio::test]
async fn test_last_iteration_keeps_only_compilable_cases() {
    let mut harness = Harness::new(vec![Scripted::Suite(suite(vec![
        good_case("addTest"),
        broken_case("divideTest"),
    ]))]);

    let outcome = harness.run(1).await;
    let response = outcome.unwrap();

    assert!(response.is_ok());
    let names: Vec<&str> = response
        .generated_test_suite()
        .unwrap()
        .test_cases
        .iter()
        .map(|test_case| test_case.name.as_str())
        .collect();
    assert_eq!(names, vec!["addTest"]);
    assert_eq!(outcome.report.len(), 1);
    assert_eq!(outcome.report.test_case_list[&0].test_name, "addTest");

    let suite_source = std::fs::read_to_string(harness.suite_file()).unwrap();
    assert!(!suite_source.contains(BROKEN_MARKER));
    assert!(suite_source.contains("addTest"));

    let compilations = harness.compilations().iterations;
    assert_eq!(compilations.len(), 1);
    assert_eq!(compilations[0].test_suite.exit_code, 0);
    assert_eq!(compilations[0].test_cases.total, 2);
    assert_eq!(compilations[0].test_cases.compilable, 1);
}

#[tokio::test]
async fn test_last_iteration_without_compilable_cases_fails() {
    let mut harness = Harness::new(vec![Scripted::Suite(suite(vec![broken_case("addTest")]))]);

    let outcome = harness.run(1).await;
    let response = outcome.unwrap();

    assert_eq!(
        response.execution_result(),
        FeedbackCycleExecutionResult::NoCompilableTestCasesGenerated
    );
    assert!(response.generated_test_suite().is_none());
    assert!(response.compilable_test_cases().is_empty());
    assert_eq!(harness.compilations().iterations.len(), 1);
}

#[tokio::test]
async fn test_empty_and_unparsable_answers_are_retried() {
    let mut harness = Harness::new(vec![
        Scripted::Error(ResponseErrorCode::EmptyLlmResponse),
        Scripted::Error(ResponseErrorCode::TestSuiteParsingFailure),
        Scripted::Suite(suite(vec![good_case("addTest")])),
    ]);

    let outcome = harness.run(3).await;

    assert!(outcome.unwrap().is_ok());
    assert_eq!(
        outcome.warnings,
        vec![
            WarningType::NoTestCasesGenerated,
            WarningType::TestSuiteParsingFailed
        ]
    );

    let prompts = &harness.request_manager.prompts;
    assert_eq!(
        prompts[1],
        "You have provided an empty answer! Please answer my previous question with the same formats."
    );
    assert_eq!(
        prompts[2],
        "The provided code is not parsable. Please, generate the correct code"
    );

    assert_eq!(harness.iterations().iterations.len(), 3);
    let compilations = harness.compilations().iterations;
    assert_eq!(compilations.len(), 1);
    assert_eq!(compilations[0].iteration, 3);
}

#[tokio::test]
async fn test_suite_without_test_cases_is_retried() {
    let mut harness = Harness::new(vec![
        Scripted::Suite(suite(vec![])),
        Scripted::Suite(suite(vec![good_case("addTest")])),
    ]);

    let outcome = harness.run(2).await;

    assert!(outcome.unwrap().is_ok());
    assert_eq!(outcome.warnings, vec![WarningType::NoTestCasesGenerated]);
    assert!(harness.request_manager.prompts[1].starts_with("You have provided an empty answer!"));
}

#[tokio::test]
async fn test_exhausted_budget_emits_accumulated_cases() {
    let mut harness = Harness::new(vec![
        Scripted::Suite(suite(vec![good_case("addTest"), broken_case("divideTest")])),
        Scripted::Error(ResponseErrorCode::EmptyLlmResponse),
    ]);

    let outcome = harness.run(2).await;
    let response = outcome.unwrap();

    assert!(response.is_ok());
    assert_eq!(outcome.requests_count, 2);
    assert_eq!(harness.request_manager.prompts.len(), 2);
    assert_eq!(response.generated_test_suite().unwrap().test_cases, vec![good_case("addTest")]);
    assert_eq!(outcome.report.len(), 1);

    let suite_source = std::fs::read_to_string(harness.suite_file()).unwrap();
    assert!(!suite_source.contains(BROKEN_MARKER));
}

#[tokio::test]
async fn test_exhausted_budget_without_cases_fails() {
    let mut harness = Harness::new(vec![
        Scripted::Error(ResponseErrorCode::EmptyLlmResponse),
        Scripted::Error(ResponseErrorCode::EmptyLlmResponse),
    ]);

    let outcome = harness.run(2).await;

    assert_eq!(
        outcome.unwrap().execution_result(),
        FeedbackCycleExecutionResult::NoCompilableTestCasesGenerated
    );
    assert_eq!(harness.request_manager.prompts.len(), 2);
    assert_eq!(harness.iterations().iterations.len(), 2);
}

#[tokio::test]
async fn test_rediscovered_cases_are_deduplicated() {
    let mut harness = Harness::new(vec![
        Scripted::Suite(suite(vec![good_case("addTest"), broken_case("divideTest")])),
        Scripted::Suite(suite(vec![good_case("addTest"), broken_case("modTest")])),
    ]);

    let outcome = harness.run(2).await;
    let response = outcome.unwrap();

    assert!(response.is_ok());
    assert_eq!(response.compilable_test_cases().len(), 1);
    assert_eq!(response.generated_test_suite().unwrap().test_cases.len(), 1);
}

#[tokio::test]
async fn test_save_failure_terminates() {
    let mut harness = Harness::new(vec![Scripted::Suite(suite(vec![good_case("addTest")]))]);
    harness.storage = Box::new(FailingStorage);

    let outcome = harness.run(2).await;

    assert_eq!(
        outcome.unwrap().execution_result(),
        FeedbackCycleExecutionResult::SavingTestFilesIssue
    );
    assert!(harness.compilations().iterations.is_empty());
}

#[tokio::test]
async fn test_missing_compiler_is_fatal() {
    let mut harness = Harness::new(vec![Scripted::Suite(suite(vec![good_case("addTest")]))]);
    harness.compiler = Box::new(MissingCompiler);

    let outcome = harness.run(3).await;

    assert!(matches!(
        outcome.response,
        Err(FeedbackCycleError::Compiler(CompilerError::CompilerNotFound { .. }))
    ));
    assert_eq!(harness.request_manager.prompts.len(), 1);
}

#[tokio::test]
async fn test_artifact_text_files_are_written() {
    let mut harness = Harness::new(vec![
        Scripted::Suite(suite(vec![broken_case("addTest")])),
        Scripted::Suite(suite(vec![good_case("addTest")])),
    ]);

    harness.run(2).await.unwrap();

    let responses = harness.artifact_text(LLM_RESPONSE_FILE);
    assert!(responses.starts_with("[IMPORTANT]: Max feedback cycle iterations: 2\n"));
    assert!(responses.contains("Iteration #1"));
    assert!(responses.contains("Iteration #2"));

    let log = harness.artifact_text(LOG_FILE);
    assert!(log.contains("Feedback cycle finished: OK with 1 test case(s)"));
}

#[tokio::test]
async fn test_invalid_setup_is_rejected() {
    let mut harness = Harness::new(vec![]);

    for (prompt, max_iterations) in [(INITIAL_PROMPT, 0), ("   ", 3)] {
        let settings = harness.settings(max_iterations);
        let result = LlmWithFeedbackCycle::new(
            prompt,
            settings,
            FeedbackCycleCollaborators {
                request_manager: &mut harness.request_manager,
                tests_assembler: &mut harness.assembler,
                prompt_size_reduction_strategy: &mut harness.reduction,
                test_compiler: harness.compiler.as_ref(),
                test_storage: harness.storage.as_ref(),
                tests_presenter: &harness.presenter,
                indicator: &harness.cancellation,
                recorder: &harness.recorder,
            },
        );
        assert!(matches!(result, Err(FeedbackCycleError::InvalidSetup(_))));
    }
}
