// kernel/src/arch/interrupts.rs
//
// 役割:
// - Interrupt Gate: 起動シーケンスの最初に、割込みを「BASEPRI でマスク済み・PRIMASK 解除」の状態にする。
//
// やること:
// - BASEPRI に割込み禁止の閾値を書く（disint 相当）
// - その後で PRIMASK を解除する (cpsie i)
//
// やらないこと:
// - 個別割込みの許可/優先度設定（カーネル本体の責務）
//
// 重要:
// - 順序は BASEPRI -> PRIMASK 固定。逆にすると一瞬だけ全割込みが通る窓ができる。
// - この時点では static は未初期化なので、logging / trace は呼ばない。

use crate::arch::Cpu;
use crate::config::{intpri_val, INTPRI_MAX_EXTINT_PRI};

/// BASEPRI に書く値
pub const DISABLE_BASEPRI: u8 = intpri_val(INTPRI_MAX_EXTINT_PRI);

pub fn open_gate<C: Cpu + ?Sized>(cpu: &mut C) {
    cpu.set_basepri(DISABLE_BASEPRI);
    cpu.enable_irq();
}
