// kernel/src/arch/cpu.rs
// CPU 命令ラッパ (cortex-m)。unsafe は最小限。

use super::Cpu;

/// 実機の Cortex-M コア
pub struct CortexM {
    _private: (),
}

impl CortexM {
    /// # Safety
    /// - 起動シーケンスの中で 1 つだけ作ること。
    pub const unsafe fn new() -> Self {
        CortexM { _private: () }
    }
}

impl Cpu for CortexM {
    #[inline(always)]
    fn set_basepri(&mut self, value: u8) {
        // Safety: 起動中は単一コア・単一スレッド。マスク値の変更で壊れる臨界区間は無い
        unsafe { cortex_m::register::basepri::write(value) }
    }

    #[inline(always)]
    fn enable_irq(&mut self) {
        // Safety: BASEPRI で先にマスク済み（Interrupt Gate の順序）
        unsafe { cortex_m::interrupt::enable() }
    }

    #[inline(always)]
    fn idle(&mut self) {
        cortex_m::asm::nop();
    }
}

pub fn halt_loop() -> ! {
    cortex_m::interrupt::disable();
    loop {
        cortex_m::asm::nop();
    }
}
