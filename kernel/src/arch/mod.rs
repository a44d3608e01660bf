// kernel/src/arch/mod.rs
//
// アーキ依存部 (ARMv7-M)。unsafe をできるだけここに閉じ込める方針。
// - bus: メモリ/レジスタへのワードアクセス
// - scb: 型付き SCB レジスタ
// - cpu: BASEPRI / PRIMASK / 停止ループ（実機のみ）
// - interrupts: Interrupt Gate
// - vector: ベクタテーブルの RAM 再配置
// - priority: 例外優先度の設定

pub mod bus;
pub mod interrupts;
pub mod priority;
pub mod scb;
pub mod vector;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod cpu;

/// 起動シーケンスが CPU 本体に要求する操作
pub trait Cpu {
    /// BASEPRI に値を書く（0 はマスク無し）
    fn set_basepri(&mut self, value: u8);
    /// PRIMASK を解除する (cpsie i)
    fn enable_irq(&mut self);
    /// 停止ループの 1 周分
    fn idle(&mut self);
}

impl<T: Cpu + ?Sized> Cpu for &mut T {
    fn set_basepri(&mut self, value: u8) {
        (**self).set_basepri(value)
    }

    fn enable_irq(&mut self) {
        (**self).enable_irq()
    }

    fn idle(&mut self) {
        (**self).idle()
    }
}

/// CPU をこの場に留める（戻らない）
pub fn park<C: Cpu + ?Sized>(cpu: &mut C) -> ! {
    loop {
        cpu.idle();
    }
}

/// CPU を停止させるループ（panic 用、実機のみ）
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub fn halt_loop() -> ! {
    cpu::halt_loop()
}
