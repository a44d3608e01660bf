// kernel/src/boot/trace.rs
//
// 低コスト trace（観測性）を 1 箇所に集約する。
// - 起動シーケンスの各ステップ完了を 1 行ずつ出す
//
// 設計方針:
// - logging 側に新 API を要求しない（info のみで完結）
// - no_std 前提で heap 確保なし（固定文字列のみ）
// - section 初期化が終わるまでは呼ばない（logging が static を読むため）
//
// feature:
// - boot_trace: ステップ trace を有効化（無効時は何も生成しない）

// ★重要：BootStep は “常に存在” させる（feature off でもコンパイル可能にする）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootStep {
    InterruptGate,
    Sections,
    StartupHw,
    VectorTable,
    Priorities,
    SystemClock,
    LowMemory,
    Handoff,
}

impl BootStep {
    /// 実行順
    pub const ORDER: [BootStep; 8] = [
        BootStep::InterruptGate,
        BootStep::Sections,
        BootStep::StartupHw,
        BootStep::VectorTable,
        BootStep::Priorities,
        BootStep::SystemClock,
        BootStep::LowMemory,
        BootStep::Handoff,
    ];

    pub const fn line(self) -> &'static str {
        match self {
            BootStep::InterruptGate => "boot_trace step=interrupt_gate",
            BootStep::Sections => "boot_trace step=sections",
            BootStep::StartupHw => "boot_trace step=startup_hw",
            BootStep::VectorTable => "boot_trace step=vector_table",
            BootStep::Priorities => "boot_trace step=priorities",
            BootStep::SystemClock => "boot_trace step=system_clock",
            BootStep::LowMemory => "boot_trace step=low_memory",
            BootStep::Handoff => "boot_trace step=handoff",
        }
    }
}

#[inline(always)]
pub fn trace_step(step: BootStep) {
    #[cfg(feature = "boot_trace")]
    crate::logging::info(step.line());
    #[cfg(not(feature = "boot_trace"))]
    {
        let _ = step;
    }
}
