mod quiz_vm;

pub use quiz_vm::{
    FAIL_MESSAGE, HIDDEN_SCORE_LABEL, OptionButtonVm, PASS_MESSAGE, QuestionScreenVm, QuizIntent,
    ResultScreenVm, ScreenVm, StartScreenVm, SummaryItemVm, map_screen,
};
