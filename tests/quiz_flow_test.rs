//! Quiz phases, scoring and question bank loading


use face_filter::{
    app::{Demo, DemoState},
    config::Config,
    interaction::CanvasSize,
    quiz::{choice_regions, Feedback, QuestionBank, QuizPhase, QuizQuestion, QuizState, QuizTimings},
    Error,
};
use rand::{rngs::StdRng, SeedableRng};
use std::time::{Duration, Instant};
use test_helpers::{detections_with_hands, hand_with_tip, write_temp_file};

fn question(text: &str, correct_index: usize) -> QuizQuestion {
    QuizQuestion {
        text: text.to_string(),
        choices: ["A".to_string(), "B".to_string()],
        correct_index,
    }
}

fn bank() -> QuestionBank {
    QuestionBank::new(vec![question("next one", 1), question("another", 0)]).unwrap()
}

#[test]
fn test_correct_answer_scores_and_shows_feedback() {
    let start = Instant::now();
    let mut quiz = QuizState::new(question("first", 0), QuizTimings::default());

    let selection = quiz.select(0, start).unwrap();
    assert!(selection.correct);
    assert_eq!(quiz.score(), 1);

    assert_eq!(quiz.feedback(start), Some(Feedback::Correct));
    assert_eq!(quiz.feedback(start + Duration::from_millis(1199)), Some(Feedback::Correct));
    assert_eq!(quiz.feedback(start + Duration::from_millis(1200)), None);
}

#[test]
fn test_selection_during_feedback_is_ignored() {
    let start = Instant::now();
    let mut quiz = QuizState::new(question("first", 0), QuizTimings::default());
    quiz.select(1, start).unwrap();
    assert_eq!(quiz.score(), 0);

    for ms in [100, 2500, 4999] {
        assert!(quiz.select(0, start + Duration::from_millis(ms)).is_none());
        assert_eq!(quiz.score(), 0);
        assert_eq!(quiz.question().text, "first");
    }
    assert!(matches!(quiz.phase(), QuizPhase::FeedbackShown { .. }));
}

#[test]
fn test_question_replaced_after_delay() {
    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(42);
    let bank = bank();
    let mut quiz = QuizState::new(question("first", 0), QuizTimings::default());
    quiz.select(0, start).unwrap();

    assert!(!quiz.tick(start + Duration::from_millis(4999), &bank, &mut rng).unwrap());
    assert_eq!(quiz.question().text, "first");

    assert!(quiz.tick(start + Duration::from_millis(5000), &bank, &mut rng).unwrap());
    assert_ne!(quiz.question().text, "first");
    assert_eq!(quiz.phase(), QuizPhase::QuestionActive);

    // a second tick in the active phase changes nothing
    let current = quiz.question().clone();
    assert!(!quiz.tick(start + Duration::from_millis(9000), &bank, &mut rng).unwrap());
    assert_eq!(quiz.question(), &current);
}

#[test]
fn test_score_never_negative() {
    let start = Instant::now();
    let timings = QuizTimings {
        debounce: Duration::ZERO,
        question_delay: Duration::ZERO,
        feedback_window: Duration::ZERO,
    };
    let bank = QuestionBank::new(vec![question("always zero", 0)]).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let mut quiz = QuizState::new(question("always zero", 0), timings).with_penalty(1);

    quiz.select(0, start).unwrap();
    for _ in 0..3 {
        quiz.tick(start, &bank, &mut rng).unwrap();
        quiz.select(1, start).unwrap();
    }
    assert_eq!(quiz.score(), 0);
}

#[test]
fn test_bank_file_with_turkish_keys() {
    let path = write_temp_file(
        "questions.json",
        r#"[
            {"soru": "Türkiye'nin başkenti Ankara mı?", "secenekler": ["Evet", "Hayır"], "dogru": 0},
            {"text": "Is the sky green?", "choices": ["Yes", "No"], "correct_index": 1}
        ]"#,
    );
    let bank = QuestionBank::from_file(&path).unwrap();
    assert_eq!(bank.len(), 2);
}

#[test]
fn test_empty_bank_file_refuses_quiz() {
    let path = write_temp_file("empty_questions.json", "[]");
    let mut config = Config::default();
    config.quiz.question_bank = path;
    let result = DemoState::new(Demo::Quiz, &config, Instant::now());
    assert!(matches!(result, Err(Error::EmptyQuestionBank)));
}

#[test]
fn test_missing_bank_file_is_io_error() {
    let mut config = Config::default();
    config.quiz.question_bank = "no/such/questions.json".into();
    let result = DemoState::new(Demo::Quiz, &config, Instant::now());
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_pointing_during_feedback_does_not_rescore() {
    let start = Instant::now();
    let mut config = Config::default();
    config.camera.mirror = false;
    let bank = QuestionBank::new(vec![question("only", 0)]).unwrap();
    let mut state = DemoState::with_bank(Demo::Quiz, &config, Some(bank), start).unwrap();

    let canvas = CanvasSize::new(1280.0, 720.0);
    let (left, _) = choice_regions(canvas)[0];
    let tip = left.center();
    let detections = detections_with_hands(vec![hand_with_tip(tip.x / canvas.width, tip.y / canvas.height)]);

    // hold the finger on the correct box for four seconds
    for frame in 0..120u64 {
        state
            .update(&detections, canvas, start + Duration::from_millis(frame * 33))
            .unwrap();
    }
    assert_eq!(state.quiz().unwrap().score(), 1);

    // after the replacement delay and debounce, the held finger answers again
    state
        .update(&detections, canvas, start + Duration::from_millis(5100))
        .unwrap();
    assert_eq!(state.quiz().unwrap().score(), 2);
}
